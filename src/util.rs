/// An implementation of div_ceil to lower MSRV.
pub(crate) const fn div_ceil(a: usize, b: usize) -> usize {
    debug_assert!(b > 0);

    let d = a / b;
    if a % b != 0 {
        d + 1
    } else {
        d
    }
}
