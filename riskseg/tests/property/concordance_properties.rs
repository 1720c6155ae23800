use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use riskseg::{
    Dataset, Interpretation, Schema, SegmentTester, TestKind, Value, columns, interpret,
};

/// Normal sample via Box-Muller
fn normal_sample(rng: &mut StdRng, n: usize, mean: f64, std_dev: f64) -> Vec<f64> {
    (0..n)
        .map(|_| {
            let u1: f64 = rng.gen_range(f64::EPSILON..1.0);
            let u2: f64 = rng.gen_range(0.0..1.0);
            let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
            mean + std_dev * z
        })
        .collect()
}

fn two_group_dataset(a: &[f64], b: &[f64]) -> Dataset {
    let rows = a
        .iter()
        .map(|x| ("A", *x))
        .chain(b.iter().map(|x| ("B", *x)))
        .map(|(group, premium)| {
            vec![
                (columns::POSTAL_CODE, Value::from(group)),
                (columns::TOTAL_PREMIUM, Value::from(premium)),
            ]
        });
    Dataset::from_records(Schema::insurance(), rows).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn t_and_z_agree_on_large_separated_samples(
        seed in any::<u64>(),
        n_a in 1000usize..1400,
        n_b in 1000usize..1400,
        shift in 0.5f64..3.0,
        flip in any::<bool>(),
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let offset = if flip { -shift } else { shift };
        let a = normal_sample(&mut rng, n_a, 10.0, 1.0);
        let b = normal_sample(&mut rng, n_b, 10.0 + offset, 1.0);
        let data = two_group_dataset(&a, &b);

        let tester = SegmentTester::new(&data);
        let group_a = tester.segment(columns::POSTAL_CODE, Some(&"A".into()), &[]).unwrap();
        let group_b = tester.segment(columns::POSTAL_CODE, Some(&"B".into()), &[]).unwrap();

        let t = tester.mean_difference_test_small(&group_a, &group_b, columns::TOTAL_PREMIUM).unwrap();
        let z = tester.mean_difference_test_large(&group_a, &group_b, columns::TOTAL_PREMIUM).unwrap();

        let t_stat = t.statistic.unwrap();
        let z_stat = z.statistic.unwrap();
        prop_assert_eq!(t_stat.signum(), z_stat.signum());
        prop_assert_eq!(t_stat.signum(), -offset.signum());
        prop_assert_eq!(t.interpretation, z.interpretation);
        prop_assert_eq!(t.interpretation, Interpretation::Reject);
        prop_assert_eq!(tester.choose_test(group_a.len(), group_b.len()), TestKind::ZTest);
    }

    #[test]
    fn exclusion_removes_every_excluded_row(
        genders in prop::collection::vec(0usize..4, 0..60),
        excluded in 0usize..4,
    ) {
        const NAMES: [&str; 4] = ["Male", "Female", "Not Specified", "Other"];
        let data = Dataset::from_records(
            Schema::insurance(),
            genders.iter().map(|g| vec![(columns::GENDER, Value::from(NAMES[*g]))]),
        )
        .unwrap();
        let tester = SegmentTester::new(&data);
        let excluded_value = Value::from(NAMES[excluded]);

        let kept = tester.segment(columns::GENDER, None, &[excluded_value.clone()]).unwrap();
        let removed = genders.iter().filter(|g| **g == excluded).count();
        prop_assert_eq!(kept.len(), genders.len() - removed);
        prop_assert!(kept.values(columns::GENDER).unwrap().iter().all(|v| **v != excluded_value));

        // value filter inside an exclusion never returns the excluded value
        let both = tester
            .segment(columns::GENDER, Some(&excluded_value), &[excluded_value.clone()])
            .unwrap();
        prop_assert!(both.is_empty());
        prop_assert_eq!(data.len(), genders.len());
    }

    #[test]
    fn interpretation_is_threshold_on_p(p in 0.0f64..1.0, alpha in 0.001f64..0.5) {
        let decision = interpret(Some(p), alpha);
        prop_assert_eq!(decision.is_rejection(), p < alpha);
        prop_assert_ne!(decision, Interpretation::Skipped);
    }
}
