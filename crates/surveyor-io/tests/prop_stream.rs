use proptest::prelude::*;
use surveyor_geom::BlockPos;
use surveyor_io::{ByteReader, ByteWriter, DecodeError, UNSET_COORD};

fn arb_pos() -> impl Strategy<Value = BlockPos> {
    (
        any::<i32>().prop_filter("x reserved for unset", |x| *x != UNSET_COORD),
        any::<i16>(),
        any::<i32>(),
    )
        .prop_map(|(x, y, z)| BlockPos::new(x, i32::from(y), z))
}

proptest! {
    // Positions whose height fits the short survive the stream unchanged
    #[test]
    fn opt_pos_preserved(p in proptest::option::of(arb_pos())) {
        let mut w = ByteWriter::new();
        w.write_opt_pos(p);
        let bytes = w.into_bytes();
        let mut r = ByteReader::new(&bytes);
        prop_assert_eq!(r.read_opt_pos().unwrap(), p);
        prop_assert!(r.finish().is_ok());
    }

    // Any truncation of a valid stream is reported, never panics
    #[test]
    fn truncation_is_an_error(p in arb_pos(), cut in 0usize..10) {
        let mut w = ByteWriter::new();
        w.write_opt_pos(Some(p));
        let bytes = w.into_bytes();
        let mut r = ByteReader::new(&bytes[..cut]);
        let is_eof = matches!(r.read_opt_pos(), Err(DecodeError::UnexpectedEof { .. }));
        prop_assert!(is_eof);
    }
}
