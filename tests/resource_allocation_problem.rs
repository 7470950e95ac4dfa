//! A resource allocation problem: decide the production quantities of several products.
//! Each product requires a certain amount of fuel and time to produce,
//! and provides a specific profit per unit.
//!
//! The goal is to maximize the overall profit without exceeding the available fuel and time.
//! The same problem is solved with continuous quantities, then with whole units.

use float_eq::assert_float_eq;
use mip_lp::{
    constraint, variable, Constraint, Expression, Model, Solution, SolveConfig, SolveResult,
    SolveStatus, ToleranceContext, Variable,
};

struct Product {
    // amount of fuel producing 1 unit takes
    needed_fuel: f64,
    // time it takes to produce 1 unit
    needed_time: f64,
    value: f64, // The amount of money we can sell an unit of the product for
}

/// Fuel and time are both resources, with a fixed amount available and a variable amount consumed by each product
struct Resource {
    available: f64,
    consumed: Expression,
}

struct ResourceAllocationProblem {
    model: Model,
    /// The total amount of money we can make by producing the products
    total_value: Expression,
    fuel: Resource,
    time: Resource,
    whole_units: bool,
}

impl ResourceAllocationProblem {
    fn new(available_fuel: f64, available_time: f64, whole_units: bool) -> Self {
        ResourceAllocationProblem {
            model: Model::new(),
            total_value: 0.into(),
            fuel: Resource {
                available: available_fuel,
                consumed: 0.into(),
            },
            time: Resource {
                available: available_time,
                consumed: 0.into(),
            },
            whole_units,
        }
    }

    /// Add a new product to take into account in the optimization
    fn add(&mut self, product: Product) -> Variable {
        let mut definition = variable().min(0);
        if self.whole_units {
            definition = definition.integer();
        }
        let amount_to_produce = self.model.add_variable(definition).unwrap();
        self.total_value += amount_to_produce * product.value;
        self.fuel.consumed += amount_to_produce * product.needed_fuel;
        self.time.consumed += amount_to_produce * product.needed_time;
        amount_to_produce
    }

    fn constraints(fuel: Resource, time: Resource) -> Vec<Constraint> {
        let mut constraints = Vec::with_capacity(2);
        for resource in [fuel, time] {
            constraints.push(constraint!(resource.consumed <= resource.available));
        }
        constraints
    }

    /// Solve the problem, returning the optimal amount of each product to produce.
    fn best_product_quantities(self) -> (Model, SolveResult) {
        let ResourceAllocationProblem {
            mut model,
            total_value,
            fuel,
            time,
            ..
        } = self;
        model
            .add_constraints(Self::constraints(fuel, time))
            .unwrap();
        model.set_objective(total_value);
        let result = model.maximise(&SolveConfig::default());
        (model, result)
    }
}

#[test]
fn resource_allocation() {
    let mut pb = ResourceAllocationProblem::new(5., 3., false);
    let steel = pb.add(Product {
        needed_fuel: 1.,
        needed_time: 1.,
        value: 10.,
    });
    let stainless_steel = pb.add(Product {
        needed_fuel: 2.,
        needed_time: 1.,
        value: 11.,
    });

    let (model, solution) = pb.best_product_quantities();

    assert_eq!(solution.status(), SolveStatus::Optimal);
    // The amount of steel we should produce
    assert_float_eq!(1., solution.value(steel), abs <= 1e-8);
    // The amount of stainless steel we should produce
    assert_float_eq!(2., solution.value(stainless_steel), abs <= 1e-8);
    assert_float_eq!(32., solution.objective(), abs <= 1e-8);
    assert!(model.validate(&ToleranceContext::new(7, 6)));
}

#[test]
fn using_a_vector() {
    let products = vec![
        Product {
            needed_fuel: 1.,
            needed_time: 1.,
            value: 10.,
        },
        Product {
            needed_fuel: 2.,
            needed_time: 1.,
            value: 11.,
        },
    ];

    let mut pb = ResourceAllocationProblem::new(5., 3., false);
    let variables: Vec<_> = products.into_iter().map(|p| pb.add(p)).collect();
    let (_, solution) = pb.best_product_quantities();
    let product_quantities: Vec<_> = variables.iter().map(|&v| solution.value(v)).collect();
    assert_float_eq!(1., product_quantities[0], abs <= 1e-8);
    assert_float_eq!(2., product_quantities[1], abs <= 1e-8);
}

#[test]
fn whole_units() {
    // With 5.5 fuel the continuous optimum is fractional: 0.5 steel and 2.5 stainless steel
    let products = [(1., 1., 10.), (2., 1., 11.)];
    let mut continuous = ResourceAllocationProblem::new(5.5, 3., false);
    let mut whole = ResourceAllocationProblem::new(5.5, 3., true);
    for &(needed_fuel, needed_time, value) in &products {
        for pb in [&mut continuous, &mut whole] {
            pb.add(Product {
                needed_fuel,
                needed_time,
                value,
            });
        }
    }
    let (_, relaxed) = continuous.best_product_quantities();
    let (model, integral) = whole.best_product_quantities();
    assert_float_eq!(relaxed.objective(), 32.5, abs <= 1e-8);
    assert_eq!(integral.status(), SolveStatus::Optimal);
    // (1, 2) is the best whole production plan
    assert_eq!(integral.values(), &[1., 2.]);
    assert!(integral.objective() <= relaxed.objective());
    assert!(model.validate(&ToleranceContext::new(7, 6)));
}
