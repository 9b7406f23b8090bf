//! Compiled-in anti-alias kernels for rational resampling.
//!
//! Windowed-sinc low-pass designs (Kaiser window, beta 5.0), `20 * factor + 1`
//! taps each, cutoff at `1 / factor` of the intermediate Nyquist frequency.
//! The taps sum to unity; the selector scales them by the upsampling factor
//! before handing them to the engine.

/// Anti-alias low-pass for a maximum factor of 2 (cutoff at 1/2 of the intermediate Nyquist).
#[rustfmt::skip]
pub const FIR_RESAMPLE_FAC2: [f32; 41] = [
    -7.158971096141e-19, -0.001051458762959, 1.854299878147e-18, 0.002508966717869,
    -3.494145324274e-18, -0.004894834477454, 5.606451107282e-18, 0.00855655875057,
    -8.091013394948e-18, -0.01398997288197, 1.078113213278e-17, 0.02202312089503,
    -1.345967778667e-17, -0.03434018045664, 1.588460076576e-17, 0.05528828501701,
    -1.782020670786e-17, -0.1009301990271, 1.906929740929e-17, 0.3167003393173,
    0.500258743763, 0.3167003393173, 1.906929740929e-17, -0.1009301990271,
    -1.782020670786e-17, 0.05528828501701, 1.588460076576e-17, -0.03434018045664,
    -1.345967778667e-17, 0.02202312089503, 1.078113213278e-17, -0.01398997288197,
    -8.091013394948e-18, 0.00855655875057, 5.606451107282e-18, -0.004894834477454,
    -3.494145324274e-18, 0.002508966717869, 1.854299878147e-18, -0.001051458762959,
    -7.158971096141e-19,
];

/// Anti-alias low-pass for a maximum factor of 3.
#[rustfmt::skip]
pub const FIR_RESAMPLE_FAC3: [f32; 61] = [
    -4.773070465845e-19, -0.0005075758090243, -0.0007171615143307, 1.236309520196e-18,
    0.001275830902159, 0.001636325730942, -2.329636735609e-18, -0.002551690209657,
    -0.003121165791526, 3.73796549522e-18, 0.004526422824711, 0.005382746923715,
    -5.394486902496e-18, -0.007467288523912, -0.008729113265872, 7.188058902382e-18,
    0.01180763635784, 0.01369067002088, -8.973913720743e-18, -0.01839848794043,
    -0.02138582989573, 1.059067296956e-17, 0.02934103831649, 0.0348413400352,
    -1.188119135761e-17, -0.05182809010148, -0.06626323610544, 1.271399183525e-17,
    0.1365522146225, 0.2751477360725, 0.3335354030132, 0.2751477360725,
    0.1365522146225, 1.271399183525e-17, -0.06626323610544, -0.05182809010148,
    -1.188119135761e-17, 0.0348413400352, 0.02934103831649, 1.059067296956e-17,
    -0.02138582989573, -0.01839848794043, -8.973913720743e-18, 0.01369067002088,
    0.01180763635784, 7.188058902382e-18, -0.008729113265872, -0.007467288523912,
    -5.394486902496e-18, 0.005382746923715, 0.004526422824711, 3.73796549522e-18,
    -0.003121165791526, -0.002551690209657, -2.329636735609e-18, 0.001636325730942,
    0.001275830902159, 1.236309520196e-18, -0.0007171615143307, -0.0005075758090243,
    -4.773070465845e-19,
];

/// Anti-alias low-pass for a maximum factor of 4.
#[rustfmt::skip]
pub const FIR_RESAMPLE_FAC4: [f32; 81] = [
    -3.579911546086e-19, -0.0002826493873727, -0.0005257919547148, -0.0004754169785883,
    9.272602642876e-19, 0.0007316285045817, 0.001254632719792, 0.001063079806045,
    -1.747280491266e-18, -0.001483012922108, -0.002447708509862, -0.002006531460211,
    2.803559321018e-18, 0.00265127257444, 0.004278788808733, 0.00343848974444,
    -4.04598811659e-18, -0.004394791088998, -0.006995819043368, -0.005554971285164,
    5.391207544957e-18, 0.00696672918275, 0.01101287081838, 0.008698813617229,
    -6.730639604168e-18, -0.0108557716012, -0.01717213355005, -0.01360637322068,
    7.943245850321e-18, 0.01724308542907, 0.02764743193984, 0.02232083678246,
    -8.911163799475e-18, -0.03003358840942, -0.05047110468149, -0.04349443688989,
    9.535783596445e-18, 0.07413570582867, 0.1583690196276, 0.2249081432819,
    0.2501591444016, 0.2249081432819, 0.1583690196276, 0.07413570582867,
    9.535783596445e-18, -0.04349443688989, -0.05047110468149, -0.03003358840942,
    -8.911163799475e-18, 0.02232083678246, 0.02764743193984, 0.01724308542907,
    7.943245850321e-18, -0.01360637322068, -0.01717213355005, -0.0108557716012,
    -6.730639604168e-18, 0.008698813617229, 0.01101287081838, 0.00696672918275,
    5.391207544957e-18, -0.005554971285164, -0.006995819043368, -0.004394791088998,
    -4.04598811659e-18, 0.00343848974444, 0.004278788808733, 0.00265127257444,
    2.803559321018e-18, -0.002006531460211, -0.002447708509862, -0.001483012922108,
    -1.747280491266e-18, 0.001063079806045, 0.001254632719792, 0.0007316285045817,
    9.272602642876e-19, -0.0004754169785883, -0.0005257919547148, -0.0002826493873727,
    -3.579911546086e-19,
];

/// Lowest factor with a dedicated kernel.
pub const MIN_KERNEL_FACTOR: u32 = 2;

/// Kernel for the larger of the two (reduced) resampling factors.
///
/// Returns `None` for factors of 1 (no filtering needed) and for factors above
/// the table range.
pub fn kernel_for_factor(factor: u32) -> Option<&'static [f32]> {
    match factor {
        2 => Some(&FIR_RESAMPLE_FAC2),
        3 => Some(&FIR_RESAMPLE_FAC3),
        4 => Some(&FIR_RESAMPLE_FAC4),
        _ => None,
    }
}
