use crate::f;

/// Extends primitives with more specific formatting options
pub trait ValueExt {
    /// Scientific number formatting with a signed, padded exponent
    ///
    /// The default `{:e}` output drops the exponent sign and padding, which
    /// makes columns of energies and doses very hard to read.
    ///
    /// ```rust
    /// # use dosekit_utils::ValueExt;
    /// assert_eq!((-1.0_f64).sci(5, 2), "-1.00000e+00".to_string());
    /// assert_eq!((1.5e-3_f64).sci(3, 2), "1.500e-03".to_string());
    /// assert_eq!((2.0e12_f64).sci(2, 3), "2.00e+012".to_string());
    /// ```
    fn sci(&self, precision: usize, exp_pad: usize) -> String;

    /// Fraction displayed as a signed percentage
    ///
    /// ```rust
    /// # use dosekit_utils::ValueExt;
    /// assert_eq!((0.125_f64).percent(1), "+12.5%".to_string());
    /// assert_eq!((-0.5_f64).percent(0), "-50%".to_string());
    /// ```
    fn percent(&self, precision: usize) -> String;
}

impl ValueExt for f64 {
    fn sci(&self, precision: usize, exp_pad: usize) -> String {
        let mut num = f!("{:.precision$e}", self, precision = precision);
        let exp = match num.find('e') {
            Some(idx) => num.split_off(idx),
            // non-finite values have no exponent to pad
            None => return num,
        };
        let (sign, exp) = match exp.strip_prefix("e-") {
            Some(exp) => ('-', exp),
            None => ('+', &exp[1..]),
        };
        num.push_str(&f!("e{}{:0>pad$}", sign, exp, pad = exp_pad));
        num
    }

    fn percent(&self, precision: usize) -> String {
        f!("{:+.precision$}%", self * 100.0, precision = precision)
    }
}
