// tests/unit_tests.rs
use ndarray::Array4;
use burn_severity::processing::calculator::IndexCalculator;
use burn_severity::processing::indices::{DnbrCalculator, NbrCalculator, RbrCalculator, RdnbrCalculator};
use burn_severity::processing::{BandMapping, CalculationContext, DefaultCalculators};
use burn_severity::raster::{IndexRaster, SpectralRaster};
use burn_severity::Error;
use std::sync::Arc;

const NIR_BAND: &str = "B08";
const SWIR_BAND: &str = "B12";

/// Helper function to create a single-acquisition period on a regular grid
fn create_period(rows: usize, cols: usize, nir_values: &[f64], swir_values: &[f64]) -> SpectralRaster {
    create_period_at(
        (0..rows).map(|r| r as f64).collect(),
        (0..cols).map(|c| c as f64).collect(),
        nir_values,
        swir_values,
    )
}

/// Same as `create_period` with explicit coordinates
fn create_period_at(y: Vec<f64>, x: Vec<f64>, nir_values: &[f64], swir_values: &[f64]) -> SpectralRaster {
    let (rows, cols) = (y.len(), x.len());
    let mut data = Array4::<f64>::zeros((2, rows, cols, 1));

    // Fill with test data (repeating pattern if needed)
    for i in 0..rows * cols {
        data[[0, i / cols, i % cols, 0]] = nir_values[i % nir_values.len()];
        data[[1, i / cols, i % cols, 0]] = swir_values[i % swir_values.len()];
    }

    SpectralRaster::new(
        data,
        vec![NIR_BAND.to_string(), SWIR_BAND.to_string()],
        y,
        x,
        vec!["2023-06-01".to_string()],
    )
    .unwrap()
}

/// Period whose NBR equals `nbr` at every pixel
fn period_with_nbr(rows: usize, cols: usize, nbr: f64) -> SpectralRaster {
    create_period(rows, cols, &[(1.0 + nbr) / 2.0], &[(1.0 - nbr) / 2.0])
}

fn context() -> CalculationContext {
    CalculationContext::new().with_band_mapping(BandMapping::new(NIR_BAND, SWIR_BAND))
}

fn assert_all_close(raster: &IndexRaster, expected: f64, tolerance: f64) {
    for &value in raster.values().iter() {
        assert!(
            (value - expected).abs() < tolerance,
            "Expected {}, got {}",
            expected,
            value
        );
    }
}

/// Test NBR calculation with known values
#[tokio::test]
async fn test_nbr_calculation() {
    let test_cases = [
        // NIR, SWIR, Expected NBR
        (0.5, 0.1, 0.66667),
        (0.3, 0.3, 0.0),
        (0.1, 0.4, -0.6),
        (0.8, 0.0, 1.0),
    ];

    let nir_values: Vec<f64> = test_cases.iter().map(|(nir, _, _)| *nir).collect();
    let swir_values: Vec<f64> = test_cases.iter().map(|(_, swir, _)| *swir).collect();
    let period = create_period(2, 2, &nir_values, &swir_values);

    let nbr = NbrCalculator::new();
    let result = nbr.calculate(Some(&period), None, &context()).await.unwrap();
    let result_values: Vec<f64> = result.values().iter().copied().collect();

    for (i, (_, _, expected)) in test_cases.iter().enumerate() {
        assert!(
            (result_values[i] - expected).abs() < 0.0001,
            "Expected {}, got {} at index {}",
            expected,
            result_values[i],
            i
        );
    }
}

/// The same period gives the same NBR whichever slot it is passed in
#[tokio::test]
async fn test_nbr_accepts_either_period() {
    let period = create_period(2, 3, &[0.6, 0.2], &[0.2, 0.3]);
    let nbr = NbrCalculator::new();

    let from_prefire = nbr.calculate(Some(&period), None, &context()).await.unwrap();
    let from_postfire = nbr.calculate(None, Some(&period), &context()).await.unwrap();
    assert_eq!(from_prefire, from_postfire);
}

/// NBR stays within [-1, 1] for reflectances in [0, 1]
#[tokio::test]
async fn test_nbr_range() {
    let steps: Vec<f64> = (0..=10).map(|i| i as f64 / 10.0).collect();
    let mut nir_values = Vec::new();
    let mut swir_values = Vec::new();
    for &nir in &steps {
        for &swir in &steps {
            if nir == 0.0 && swir == 0.0 {
                continue;
            }
            nir_values.push(nir);
            swir_values.push(swir);
        }
    }
    let period = create_period(1, nir_values.len(), &nir_values, &swir_values);

    let result = NbrCalculator::new()
        .calculate(None, Some(&period), &context())
        .await
        .unwrap();

    for &value in result.values().iter() {
        assert!((-1.0..=1.0).contains(&value), "NBR {} out of range", value);
    }
}

/// Black pixels divide by zero and are not masked
#[tokio::test]
async fn test_nbr_unguarded_division() {
    let period = create_period(1, 2, &[0.0, 0.4], &[0.0, 0.2]);
    let result = NbrCalculator::new()
        .calculate(Some(&period), None, &context())
        .await
        .unwrap();

    assert!(!result.get(0, 0).unwrap().is_finite());
    assert!(result.get(0, 1).unwrap().is_finite());
}

/// The temporal median rejects a single cloudy acquisition
#[tokio::test]
async fn test_nbr_uses_temporal_median() {
    let mut data = Array4::<f64>::zeros((2, 1, 1, 3));
    // NIR: clear, cloudy, clear
    data[[0, 0, 0, 0]] = 0.5;
    data[[0, 0, 0, 1]] = 0.9;
    data[[0, 0, 0, 2]] = 0.5;
    // SWIR
    data[[1, 0, 0, 0]] = 0.1;
    data[[1, 0, 0, 1]] = 0.9;
    data[[1, 0, 0, 2]] = 0.1;
    let period = SpectralRaster::with_pixel_coords(
        data,
        vec![NIR_BAND.to_string(), SWIR_BAND.to_string()],
    )
    .unwrap();

    let result = NbrCalculator::new()
        .calculate(Some(&period), None, &context())
        .await
        .unwrap();
    assert!((result.get(0, 0).unwrap() - 0.4 / 0.6).abs() < 1e-12);
}

#[tokio::test]
async fn test_nbr_period_presence() {
    let period = period_with_nbr(1, 1, 0.5);
    let nbr = NbrCalculator::new();

    let neither = nbr.calculate(None, None, &context()).await.unwrap_err();
    assert!(matches!(neither, Error::InvalidArgument(_)));

    let both = nbr
        .calculate(Some(&period), Some(&period), &context())
        .await
        .unwrap_err();
    assert!(matches!(both, Error::InvalidArgument(_)));
}

#[tokio::test]
async fn test_nbr_missing_configuration() {
    let period = period_with_nbr(1, 1, 0.5);
    let nbr = NbrCalculator::new();

    let no_mapping = nbr
        .calculate(Some(&period), None, &CalculationContext::new())
        .await
        .unwrap_err();
    assert!(matches!(no_mapping, Error::MissingConfiguration(_)));

    let mut nir_only = BandMapping::default();
    nir_only.insert("nir", NIR_BAND);
    let no_swir = nbr
        .calculate(
            Some(&period),
            None,
            &CalculationContext::new().with_band_mapping(nir_only),
        )
        .await
        .unwrap_err();
    assert!(matches!(no_swir, Error::MissingConfiguration(ref msg) if msg.contains("swir")));

    let swir_only: BandMapping = [("swir", SWIR_BAND)].into_iter().collect();
    let no_nir = nbr
        .calculate(
            Some(&period),
            None,
            &CalculationContext::new().with_band_mapping(swir_only),
        )
        .await
        .unwrap_err();
    assert!(matches!(no_nir, Error::MissingConfiguration(ref msg) if msg.contains("nir")));

    let empty_nir = BandMapping::new("", SWIR_BAND);
    let blank = nbr
        .calculate(
            Some(&period),
            None,
            &CalculationContext::new().with_band_mapping(empty_nir),
        )
        .await
        .unwrap_err();
    assert!(matches!(blank, Error::MissingConfiguration(_)));
}

#[tokio::test]
async fn test_nbr_unknown_band_identifier() {
    let period = period_with_nbr(1, 1, 0.5);
    let ctx = CalculationContext::new().with_band_mapping(BandMapping::new(NIR_BAND, "swir22"));

    let err = NbrCalculator::new()
        .calculate(Some(&period), None, &ctx)
        .await
        .unwrap_err();
    assert_eq!(err, Error::BandNotFound("swir22".to_string()));
}

/// dNBR is prefire minus postfire over the shared footprint
#[tokio::test]
async fn test_dnbr_over_coordinate_intersection() {
    // prefire covers x = 0..4, postfire x = 2..6; both cover y = 0..2
    let prefire = create_period_at(
        vec![0.0, 1.0],
        vec![0.0, 1.0, 2.0, 3.0],
        &[0.5, 0.6, 0.7, 0.8],
        &[0.1],
    );
    let postfire = create_period_at(
        vec![0.0, 1.0],
        vec![2.0, 3.0, 4.0, 5.0],
        &[0.2],
        &[0.3],
    );

    let ctx = context();
    let wiring = DefaultCalculators::wire();
    let dnbr = wiring
        .dnbr
        .calculate(Some(&prefire), Some(&postfire), &ctx)
        .await
        .unwrap();

    assert_eq!(dnbr.shape(), (2, 2));
    assert_eq!(dnbr.x(), &[2.0, 3.0]);
    assert_eq!(dnbr.y(), &[0.0, 1.0]);

    let pre_nbr = wiring.nbr.calculate(Some(&prefire), None, &ctx).await.unwrap();
    let post_nbr = wiring.nbr.calculate(None, Some(&postfire), &ctx).await.unwrap();
    for row in 0..2 {
        for (col, pre_col) in [(0, 2), (1, 3)] {
            let expected = pre_nbr.get(row, pre_col).unwrap() - post_nbr.get(row, col).unwrap();
            assert!((dnbr.get(row, col).unwrap() - expected).abs() < 1e-12);
        }
    }
}

#[tokio::test]
async fn test_dnbr_sign() {
    let prefire = period_with_nbr(2, 2, 0.7);
    let postfire = period_with_nbr(2, 2, -0.2);
    let wiring = DefaultCalculators::wire();

    let dnbr = wiring
        .dnbr
        .calculate(Some(&prefire), Some(&postfire), &context())
        .await
        .unwrap();
    assert_all_close(&dnbr, 0.9, 1e-9);
}

/// RBR = dNBR / (prefire NBR + 1.001)
#[tokio::test]
async fn test_rbr_calculation() {
    let prefire = period_with_nbr(2, 2, 0.6);
    let postfire = period_with_nbr(2, 2, 0.3);
    let wiring = DefaultCalculators::wire();

    let rbr = wiring
        .rbr
        .calculate(Some(&prefire), Some(&postfire), &context())
        .await
        .unwrap();
    assert_all_close(&rbr, 0.3 / 1.601, 1e-9);
    assert_all_close(&rbr, 0.18738, 1e-5);
}

/// RdNBR only looks at the magnitude of prefire NBR
#[tokio::test]
async fn test_rdnbr_calculation() {
    let prefire = period_with_nbr(2, 2, -0.36);
    let postfire = period_with_nbr(2, 2, -0.66);
    let wiring = DefaultCalculators::wire();

    let rdnbr = wiring
        .rdnbr
        .calculate(Some(&prefire), Some(&postfire), &context())
        .await
        .unwrap();
    assert_all_close(&rdnbr, 0.5, 1e-9);
}

/// A zero prefire NBR gets the 0.001 divisor instead of dividing by zero
#[tokio::test]
async fn test_rdnbr_zero_guard() {
    let prefire = create_period(1, 1, &[0.5], &[0.5]);
    let postfire = create_period(1, 1, &[0.3], &[0.7]);
    let wiring = DefaultCalculators::wire();

    let rdnbr = wiring
        .rdnbr
        .calculate(Some(&prefire), Some(&postfire), &context())
        .await
        .unwrap();
    let value = rdnbr.get(0, 0).unwrap();
    assert!(value.is_finite());
    assert!((value - 0.4 / 0.001).abs() < 1e-6, "got {}", value);
}

/// Prefire NBR per column, from nir/swir pairs that sum to one
fn columns_with_nbr(y: Vec<f64>, x: Vec<f64>, nbr: &[f64]) -> SpectralRaster {
    let nir: Vec<f64> = nbr.iter().map(|n| (1.0 + n) / 2.0).collect();
    let swir: Vec<f64> = nbr.iter().map(|n| (1.0 - n) / 2.0).collect();
    create_period_at(y, x, &nir, &swir)
}

/// RBR and RdNBR over partially overlapping extents use prefire NBR at the
/// overlapping pixels only
#[tokio::test]
async fn test_composites_over_coordinate_intersection() {
    // prefire x = 0..4, postfire x = 2..6; overlap is x = 2, 3
    let prefire = columns_with_nbr(vec![0.0, 1.0], vec![0.0, 1.0, 2.0, 3.0], &[0.2, 0.4, 0.6, 0.36]);
    let postfire = columns_with_nbr(vec![0.0, 1.0], vec![2.0, 3.0, 4.0, 5.0], &[0.3]);
    let ctx = context();
    let wiring = DefaultCalculators::wire();

    let rbr = wiring
        .rbr
        .calculate(Some(&prefire), Some(&postfire), &ctx)
        .await
        .unwrap();
    assert_eq!(rbr.shape(), (2, 2));
    assert_eq!(rbr.x(), &[2.0, 3.0]);

    let rdnbr = wiring
        .rdnbr
        .calculate(Some(&prefire), Some(&postfire), &ctx)
        .await
        .unwrap();
    assert_eq!(rdnbr.shape(), (2, 2));
    assert_eq!(rdnbr.x(), &[2.0, 3.0]);

    for row in 0..2 {
        assert!((rbr.get(row, 0).unwrap() - 0.3 / 1.601).abs() < 1e-9);
        assert!((rbr.get(row, 0).unwrap() - 0.18738).abs() < 1e-5);
        assert!((rbr.get(row, 1).unwrap() - 0.06 / 1.361).abs() < 1e-9);

        assert!((rdnbr.get(row, 0).unwrap() - 0.3 / 0.6f64.sqrt()).abs() < 1e-9);
        assert!((rdnbr.get(row, 1).unwrap() - 0.1).abs() < 1e-9);
    }
}

#[tokio::test]
async fn test_composites_require_both_periods() {
    let period = period_with_nbr(1, 1, 0.5);
    let nbr = Arc::new(NbrCalculator::new());
    let dnbr = Arc::new(DnbrCalculator::new(Arc::clone(&nbr)));
    let composites: Vec<Arc<dyn IndexCalculator>> = vec![
        Arc::clone(&dnbr) as Arc<dyn IndexCalculator>,
        Arc::new(RbrCalculator::new(Arc::clone(&nbr), Arc::clone(&dnbr))),
        Arc::new(RdnbrCalculator::new(Arc::clone(&nbr), Arc::clone(&dnbr))),
    ];

    for calculator in composites {
        assert!(calculator.requires_pre_and_post());
        for (pre, post) in [(Some(&period), None), (None, Some(&period)), (None, None)] {
            let err = calculator.calculate(pre, post, &context()).await.unwrap_err();
            assert!(
                matches!(err, Error::InvalidArgument(_)),
                "{} returned {:?}",
                calculator.index_name(),
                err
            );
        }
    }
}

/// Test that each calculator reports its identity and dependencies
#[test]
fn test_calculator_metadata() {
    let wiring = DefaultCalculators::wire();

    assert_eq!(wiring.nbr.index_name(), "nbr");
    assert!(!wiring.nbr.requires_pre_and_post());
    assert!(wiring.nbr.dependencies().is_empty());

    assert_eq!(wiring.dnbr.index_name(), "dnbr");
    assert_eq!(wiring.dnbr.dependencies(), vec!["nbr"]);

    assert_eq!(wiring.rbr.index_name(), "rbr");
    assert_eq!(wiring.rbr.dependencies(), vec!["nbr", "dnbr"]);

    assert_eq!(wiring.rdnbr.index_name(), "rdnbr");
    assert_eq!(wiring.rdnbr.dependencies(), vec!["nbr", "dnbr"]);
}
