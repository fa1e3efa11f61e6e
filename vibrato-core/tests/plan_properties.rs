use proptest::prelude::*;

use vibrato_core::model::{radius_cm, MAX_RADIUS_CM, MIN_RADIUS_CM};
use vibrato_core::plan::{
    assemble, generate_points, AggregateType, EnvironmentInfo, GridShape, MaterialInfo,
    PhysicalInputs, SlabGeometry, MAX_FREQ_HZ, MAX_TIME_S, MIN_FREQ_HZ,
};

fn physical_inputs() -> impl Strategy<Value = PhysicalInputs> {
    (
        1.0f64..=3.0,
        50.0f64..=180.0,
        5.0f64..=40.0,
        10.0f64..=100.0,
        proptest::option::of(-20.0f64..45.0),
    )
        .prop_map(
            |(power_kw, slump_mm, aggregate_size_mm, viscosity_pas, temperature_c)| PhysicalInputs {
                power_kw,
                slump_mm,
                aggregate_size_mm,
                viscosity_pas,
                temperature_c,
            },
        )
}

fn geometry() -> impl Strategy<Value = SlabGeometry> {
    (0.1f64..15.0, 0.1f64..15.0, 10.0f64..80.0)
        .prop_map(|(width_m, length_m, thickness_cm)| SlabGeometry::new(width_m, length_m, thickness_cm))
}

proptest! {
    #[test]
    fn radius_stays_in_range(inputs in physical_inputs(), freq in 120.0f64..=220.0) {
        let r = radius_cm(
            freq,
            inputs.power_kw,
            inputs.slump_mm,
            inputs.aggregate_size_mm,
            inputs.viscosity_pas,
            inputs.temperature_c,
        );
        prop_assert!((MIN_RADIUS_CM..=MAX_RADIUS_CM).contains(&r));
    }

    #[test]
    fn layout_respects_bounds(
        slab in geometry(),
        inputs in physical_inputs(),
        base_freq in 120u16..=220,
        base_time in 6u16..=20,
        base_depth in 20.0f64..=60.0,
        base_radius in 20.0f64..=60.0,
    ) {
        let points = generate_points(&slab, base_freq, base_time, base_depth, base_radius, &inputs);
        let grid = GridShape::for_slab(&slab, base_radius);

        prop_assert!(grid.rows >= 2 && grid.cols >= 2);
        prop_assert_eq!(points.len(), grid.rows * grid.cols);

        for (index, point) in points.iter().enumerate() {
            prop_assert_eq!(point.id as usize, index + 1);
            prop_assert!(point.depth_cm <= slab.thickness_cm - 5.0);
            prop_assert!((MIN_FREQ_HZ..=MAX_FREQ_HZ).contains(&point.freq_hz));
            prop_assert!(point.time_s <= MAX_TIME_S);
            prop_assert!((MIN_RADIUS_CM..=MAX_RADIUS_CM).contains(&point.radius_cm));
        }
    }

    #[test]
    fn layout_is_deterministic(
        slab in geometry(),
        inputs in physical_inputs(),
        base_radius in 20.0f64..=60.0,
    ) {
        let first = generate_points(&slab, 180, 10, 40.0, base_radius, &inputs);
        let second = generate_points(&slab, 180, 10, 40.0, base_radius, &inputs);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn edges_get_fixed_boost(
        slab in geometry(),
        inputs in physical_inputs(),
        base_freq in 120u16..=200,
        base_time in 6u16..=18,
        base_radius in 20.0f64..=60.0,
    ) {
        let points = generate_points(&slab, base_freq, base_time, 40.0, base_radius, &inputs);
        let grid = GridShape::for_slab(&slab, base_radius);

        for (index, point) in points.iter().enumerate() {
            let (row, col) = (index / grid.cols, index % grid.cols);
            if grid.is_edge(row, col) {
                prop_assert_eq!(point.freq_hz, base_freq + 20);
                prop_assert_eq!(point.time_s, base_time + 2);
            } else {
                prop_assert_eq!(point.time_s, base_time);
            }
        }
    }

    #[test]
    fn assembled_plans_are_consistent(
        wc in -1.0f64..2.0,
        aggregate in -10.0f64..100.0,
        round in any::<bool>(),
        temperature in -50.0f64..90.0,
        humidity in -50.0f64..150.0,
        slump in -100.0f64..400.0,
        rebar in -1.0f64..2.0,
        width in -5.0f64..12.0,
        length in -5.0f64..12.0,
        thickness in -10.0f64..100.0,
        power in -1.0f64..6.0,
    ) {
        let material = MaterialInfo {
            aggregate_type: if round { AggregateType::Round } else { AggregateType::Crushed },
            water_cement_ratio: wc,
            aggregate_size_mm: aggregate,
        };
        let environment = EnvironmentInfo {
            temperature,
            humidity,
            slump,
            rebar_density: rebar,
        };
        let inputs = PhysicalInputs {
            power_kw: power,
            slump_mm: slump,
            aggregate_size_mm: aggregate,
            viscosity_pas: material.estimated_viscosity(),
            temperature_c: Some(temperature),
        };

        let strategy = assemble(
            &material,
            &environment,
            &SlabGeometry::new(width, length, thickness),
            &inputs,
        );

        prop_assert!(strategy.is_consistent());
        prop_assert!(strategy.total_points >= 4);
        prop_assert!((6..=20).contains(&strategy.vibration_params.base_time_s));
        prop_assert!((20.0..=60.0).contains(&strategy.vibration_params.base_depth_cm));

        let total_s: u64 = strategy.points.iter().map(|p| u64::from(p.time_s)).sum();
        let tenths = strategy.estimated_time_min * 10.0;
        prop_assert!((tenths - tenths.round()).abs() < 1e-9);
        prop_assert!((strategy.estimated_time_min - total_s as f64 / 60.0).abs() <= 0.05 + 1e-9);
    }
}
