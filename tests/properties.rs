//! Property tests for the bounded-arithmetic guarantees of the settlement core.

use proptest::prelude::*;

use outpost::{
    buildings::BuildingInstance,
    config::SimulationConfig,
    population::PopulationController,
    registry::BuildingTemplate,
    resources::{ResourceKind, ResourceStore, ResourceVector},
    workers::WorkerAllocator,
};

#[derive(Debug, Clone)]
enum StoreOp {
    Flow(ResourceVector, ResourceVector, f64),
    Add(ResourceVector),
    Spend(ResourceVector),
    Grow(ResourceVector),
    Shrink(ResourceVector),
}

fn vector(range: std::ops::Range<f64>) -> impl Strategy<Value = ResourceVector> {
    prop::array::uniform6(range).prop_map(|[scrap, food, water, power, medicine, caps]| {
        ResourceVector {
            scrap,
            food,
            water,
            power,
            medicine,
            caps,
        }
    })
}

fn store_op() -> impl Strategy<Value = StoreOp> {
    prop_oneof![
        (vector(0.0..50.0), vector(0.0..50.0), 0.0..3.0f64)
            .prop_map(|(p, c, dt)| StoreOp::Flow(p, c, dt)),
        vector(-500.0..500.0).prop_map(StoreOp::Add),
        vector(-10.0..300.0).prop_map(StoreOp::Spend),
        vector(0.0..100.0).prop_map(StoreOp::Grow),
        vector(0.0..100.0).prop_map(StoreOp::Shrink),
    ]
}

fn buildings() -> impl Strategy<Value = Vec<BuildingInstance>> {
    prop::collection::vec((0u32..12, -3i32..6), 0..24).prop_map(|specs| {
        specs
            .into_iter()
            .enumerate()
            .map(|(i, (required, priority))| {
                let mut template = BuildingTemplate::inert(format!("b{i}"));
                template.workers_required = required;
                template.priority = priority;
                BuildingInstance::from_template(&template, i as i32, 0)
            })
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    #[test]
    fn store_fields_stay_within_capacity(
        initial in vector(0.0..400.0),
        capacity in vector(0.0..300.0),
        ops in prop::collection::vec(store_op(), 0..40),
    ) {
        let mut store = ResourceStore::new(initial, capacity);
        for op in ops {
            match op {
                StoreOp::Flow(p, c, dt) => store.apply_flow(&p, &c, dt),
                StoreOp::Add(amounts) => store.add(&amounts),
                StoreOp::Spend(cost) => {
                    let before = *store.amounts();
                    if !store.spend(&cost) {
                        prop_assert_eq!(*store.amounts(), before);
                    }
                }
                StoreOp::Grow(amounts) => store.increase_capacity(&amounts),
                StoreOp::Shrink(amounts) => store.reduce_capacity(&amounts),
            }
            for kind in ResourceKind::ALL {
                let value = store.get(kind);
                prop_assert!(value >= 0.0, "{} went negative: {}", kind.name(), value);
                prop_assert!(value <= store.capacity_of(kind));
            }
        }
    }

    #[test]
    fn allocation_respects_requirements_and_headcount(
        total in -20i64..200,
        buildings in buildings(),
    ) {
        let mut allocator = WorkerAllocator::new();
        let assignments = allocator.recompute(total, &buildings).to_vec();
        let mut sum = 0u64;
        for assignment in &assignments {
            prop_assert!(assignment.assigned <= assignment.required);
            sum += u64::from(assignment.assigned);
        }
        prop_assert!(sum <= total.max(0) as u64);
        let stats = allocator.stats();
        prop_assert_eq!(u64::from(stats.assigned), sum);
        prop_assert_eq!(stats.assigned + stats.available, stats.total);

        let mut again = WorkerAllocator::new();
        prop_assert_eq!(again.recompute(total, &buildings), assignments.as_slice());
    }

    #[test]
    fn population_never_falls_below_one(
        initial in 1u32..20,
        steps in prop::collection::vec((any::<bool>(), any::<bool>(), 0.0..5.0f64), 1..400),
    ) {
        let config = SimulationConfig {
            death_no_food_interval: 2.0,
            death_no_water_interval: 1.0,
            growth_interval: 3.0,
            base_max_population: 20,
            ..SimulationConfig::default()
        };
        let mut controller = PopulationController::new(config, initial);
        for (fed, watered, dt) in steps {
            let stock = ResourceVector {
                food: if fed { 1_000.0 } else { 0.0 },
                water: if watered { 1_000.0 } else { 0.0 },
                ..ResourceVector::zero()
            };
            controller.advance(&stock, dt);
            prop_assert!(controller.current() >= 1);
            prop_assert!(controller.current() <= controller.max());
            prop_assert!((0.0..=100.0).contains(&controller.happiness()));
        }
    }
}
