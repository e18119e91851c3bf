//! Owned int64 arrays for DLPack shape and strides

/// Copy a dimension sequence into a freshly allocated fixed-length array
///
/// The result shares nothing with `values` and stays valid after the
/// source is mutated or dropped.
pub fn to_dl_int64_array(values: &[i64]) -> Box<[i64]> {
    values.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copies_values_in_order() {
        let out = to_dl_int64_array(&[3, 4, 5]);
        assert_eq!(&*out, &[3, 4, 5]);
    }

    #[test]
    fn test_empty() {
        assert!(to_dl_int64_array(&[]).is_empty());
    }

    #[test]
    fn test_independent_of_source() {
        let mut source = vec![3i64, 4];
        let out = to_dl_int64_array(&source);
        assert_ne!(out.as_ptr(), source.as_ptr());

        source[0] = 99;
        source.push(7);
        drop(source);

        assert_eq!(&*out, &[3, 4]);
    }
}
