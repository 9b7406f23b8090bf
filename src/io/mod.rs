// Purpose - external interfaces, file formats

pub mod wav;

pub use wav::{load_sample, write_wav, LoadError};
