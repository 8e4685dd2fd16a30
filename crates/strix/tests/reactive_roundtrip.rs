//! Conversions preserve values and their order

use futures::executor::block_on;
use proptest::prelude::*;
use strix::{from_flux, to_flux, to_mono, Observable};

proptest! {
    #[test]
    fn observable_to_flux_and_back_keeps_order(values in prop::collection::vec(any::<i64>(), 0..32)) {
        let original = Observable::from_vec(values.clone());
        let back = Observable::from_stream(to_flux(&original));

        prop_assert_eq!(block_on(back.to_vec()).unwrap(), values);
    }

    #[test]
    fn mono_yields_first_value(values in prop::collection::vec(any::<u16>(), 1..16)) {
        let observable = Observable::from_vec(values.clone());
        prop_assert_eq!(block_on(to_mono(&observable)).unwrap(), values[0]);
    }

    #[test]
    fn cold_flux_replays_for_each_conversion(values in prop::collection::vec(any::<u8>(), 0..16)) {
        let source = values.clone();
        let observable = from_flux(move || futures::stream::iter(source.clone().into_iter().map(Ok)));

        let first = block_on(Observable::from_stream(to_flux(&observable)).to_vec()).unwrap();
        let second = block_on(Observable::from_stream(to_flux(&observable)).to_vec()).unwrap();
        prop_assert_eq!(&first, &values);
        prop_assert_eq!(&second, &values);
    }
}
