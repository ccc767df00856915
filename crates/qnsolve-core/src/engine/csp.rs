//! A small finite-domain constraint satisfaction solver.
//!
//! Variables hold values from an explicit domain list; constraints are
//! arbitrary predicates over a subset of the variables. The solver runs an
//! iterative depth-first backtracking search and checks each constraint as
//! soon as the last variable in its scope is assigned, which prunes most of
//! the tree long before a full assignment exists.
//!
//! Enumeration order is deterministic: variables are assigned in creation
//! order and domain values are tried in the order they were given.

pub type VariableId = usize;

type Predicate<V> = Box<dyn Fn(&[&V]) -> bool + Send + Sync>;

struct Constraint<V> {
    scope: Vec<VariableId>,
    predicate: Predicate<V>,
}

/// A constraint satisfaction problem over values of type `V`.
pub struct Problem<V> {
    domains: Vec<Vec<V>>,
    constraints: Vec<Constraint<V>>,
}

impl<V: Clone> Default for Problem<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone> Problem<V> {
    pub fn new() -> Self {
        Self {
            domains: Vec::new(),
            constraints: Vec::new(),
        }
    }

    /// Adds a variable with the given domain and returns its id.
    pub fn add_variable(&mut self, domain: Vec<V>) -> VariableId {
        self.domains.push(domain);
        self.domains.len() - 1
    }

    /// Adds a constraint over the variables in `scope`.
    ///
    /// The predicate receives the candidate values in scope order. It is
    /// evaluated once the highest-numbered variable of the scope is assigned,
    /// so scopes should put late variables last for best pruning.
    pub fn add_constraint(
        &mut self,
        scope: Vec<VariableId>,
        predicate: impl Fn(&[&V]) -> bool + Send + Sync + 'static,
    ) {
        self.constraints.push(Constraint {
            scope,
            predicate: Box::new(predicate),
        });
    }

    pub fn variable_count(&self) -> usize {
        self.domains.len()
    }

    /// All complete assignments satisfying every constraint, in enumeration
    /// order. Each solution lists one value per variable, by variable id.
    pub fn solve_all(&self) -> Vec<Vec<V>> {
        let variable_count = self.domains.len();
        if variable_count == 0 {
            return vec![Vec::new()];
        }
        if self.domains.iter().any(Vec::is_empty) {
            return Vec::new();
        }

        let mut checks_at: Vec<Vec<usize>> = vec![Vec::new(); variable_count];
        for (index, constraint) in self.constraints.iter().enumerate() {
            if let Some(&latest) = constraint.scope.iter().max() {
                checks_at[latest].push(index);
            }
        }

        let mut solutions = Vec::new();
        let mut choice = vec![0usize; variable_count];
        let mut depth = 0usize;
        loop {
            if choice[depth] >= self.domains[depth].len() {
                if depth == 0 {
                    break;
                }
                choice[depth] = 0;
                depth -= 1;
                choice[depth] += 1;
                continue;
            }

            let consistent = checks_at[depth].iter().all(|&index| {
                let constraint = &self.constraints[index];
                let values: Vec<&V> = constraint
                    .scope
                    .iter()
                    .map(|&variable| &self.domains[variable][choice[variable]])
                    .collect();
                (constraint.predicate)(&values)
            });
            if !consistent {
                choice[depth] += 1;
                continue;
            }

            if depth + 1 == variable_count {
                solutions.push(
                    (0..variable_count)
                        .map(|variable| self.domains[variable][choice[variable]].clone())
                        .collect(),
                );
                choice[depth] += 1;
            } else {
                depth += 1;
                choice[depth] = 0;
            }
        }
        solutions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unconstrained_problem_enumerates_the_full_product() {
        let mut problem = Problem::new();
        problem.add_variable(vec![1, 2]);
        problem.add_variable(vec![10, 20, 30]);
        let solutions = problem.solve_all();
        assert_eq!(solutions.len(), 6);
        assert_eq!(solutions[0], vec![1, 10]);
        assert_eq!(solutions[5], vec![2, 30]);
    }

    #[test]
    fn constraints_prune_the_search() {
        let mut problem = Problem::new();
        let a = problem.add_variable(vec![1, 2, 3]);
        let b = problem.add_variable(vec![1, 2, 3]);
        let c = problem.add_variable(vec![1, 2, 3]);
        problem.add_constraint(vec![a, b], |values| values[0] < values[1]);
        problem.add_constraint(vec![b, c], |values| values[0] < values[1]);
        let solutions = problem.solve_all();
        assert_eq!(solutions, vec![vec![1, 2, 3]]);
    }

    #[test]
    fn scope_order_controls_argument_order() {
        let mut problem = Problem::new();
        let a = problem.add_variable(vec![5]);
        let b = problem.add_variable(vec![3]);
        problem.add_constraint(vec![b, a], |values| values[0] == &3 && values[1] == &5);
        assert_eq!(problem.solve_all().len(), 1);
    }

    #[test]
    fn unsatisfiable_problem_yields_no_solutions() {
        let mut problem = Problem::new();
        let a = problem.add_variable(vec![1, 2]);
        problem.add_constraint(vec![a], |values| *values[0] > 10);
        assert!(problem.solve_all().is_empty());
    }

    #[test]
    fn empty_domain_yields_no_solutions() {
        let mut problem: Problem<i32> = Problem::new();
        problem.add_variable(Vec::new());
        problem.add_variable(vec![1]);
        assert!(problem.solve_all().is_empty());
    }

    #[test]
    fn problem_without_variables_has_one_empty_solution() {
        let problem: Problem<i32> = Problem::new();
        assert_eq!(problem.solve_all(), vec![Vec::<i32>::new()]);
    }

    #[test]
    fn all_different_three_variables() {
        let mut problem = Problem::new();
        let vars: Vec<_> = (0..3).map(|_| problem.add_variable(vec![0, 1, 2])).collect();
        for i in 0..3 {
            for j in (i + 1)..3 {
                problem.add_constraint(vec![vars[i], vars[j]], |values| values[0] != values[1]);
            }
        }
        assert_eq!(problem.solve_all().len(), 6);
    }
}
