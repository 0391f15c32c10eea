//! Strategy dependency resolution
//!
//! Strategies are declared as `(strategy, prerequisites)` pairs. Resolution
//! rejects duplicate kinds, orders each category so that prerequisites come
//! before their dependents, and checks that cross-category prerequisites and
//! the main selection exist.

use crate::error::DefinitionError;
use crate::strategy::{Requirement, StrategyCategory, StrategyKind};
use std::collections::{HashMap, HashSet};

/// A strategy together with the prerequisites it declares
#[derive(Debug)]
pub struct Declared<T> {
    pub strategy: T,
    pub requires: Vec<Requirement>,
}

impl<T> Declared<T> {
    /// Declare a strategy
    pub fn new(strategy: T, requires: impl IntoIterator<Item = Requirement>) -> Self {
        Self {
            strategy,
            requires: requires.into_iter().collect(),
        }
    }
}

/// Kinds available per category, used for cross-category checks
pub type Available = HashMap<StrategyCategory, HashSet<StrategyKind>>;

#[derive(Clone, Copy, PartialEq)]
enum Mark {
    Fresh,
    Visiting,
    Done,
}

struct Sorter<'a> {
    category: StrategyCategory,
    kinds: &'a [StrategyKind],
    edges: Vec<Vec<usize>>,
    marks: Vec<Mark>,
    path: Vec<usize>,
    order: Vec<usize>,
}

impl Sorter<'_> {
    fn visit(&mut self, index: usize) -> Result<(), DefinitionError> {
        match self.marks[index] {
            Mark::Done => return Ok(()),
            Mark::Visiting => {
                let start = self.path.iter().position(|&i| i == index).unwrap_or(0);
                let kinds = self.path[start..].iter().map(|&i| self.kinds[i]).collect();
                return Err(DefinitionError::CyclicStrategyDependency {
                    category: self.category,
                    kinds,
                });
            }
            Mark::Fresh => {}
        }

        self.marks[index] = Mark::Visiting;
        self.path.push(index);
        for next in self.edges[index].clone() {
            self.visit(next)?;
        }
        self.path.pop();
        self.marks[index] = Mark::Done;
        self.order.push(index);
        Ok(())
    }
}

/// Order one category's strategies so prerequisites precede dependents
pub fn flatten<T>(
    category: StrategyCategory,
    declared: Vec<Declared<T>>,
    kind_of: impl Fn(&T) -> StrategyKind,
) -> Result<Vec<Declared<T>>, DefinitionError> {
    let kinds: Vec<StrategyKind> = declared.iter().map(|d| kind_of(&d.strategy)).collect();

    let mut index_of = HashMap::with_capacity(kinds.len());
    for (index, kind) in kinds.iter().enumerate() {
        if index_of.insert(*kind, index).is_some() {
            return Err(DefinitionError::DuplicateStrategyType {
                category,
                kind: *kind,
            });
        }
    }

    let mut edges = Vec::with_capacity(declared.len());
    for (index, entry) in declared.iter().enumerate() {
        let mut targets = Vec::new();
        for requirement in entry.requires.iter().filter(|r| r.category == category) {
            match index_of.get(&requirement.kind) {
                Some(&target) => targets.push(target),
                None => {
                    return Err(DefinitionError::MissingDependency {
                        dependent: kinds[index],
                        category,
                        required: requirement.kind,
                    })
                }
            }
        }
        edges.push(targets);
    }

    let mut sorter = Sorter {
        category,
        kinds: &kinds,
        edges,
        marks: vec![Mark::Fresh; declared.len()],
        path: Vec::new(),
        order: Vec::with_capacity(declared.len()),
    };
    for index in 0..declared.len() {
        sorter.visit(index)?;
    }

    let order = sorter.order;
    let mut slots: Vec<Option<Declared<T>>> = declared.into_iter().map(Some).collect();
    Ok(order.into_iter().filter_map(|index| slots[index].take()).collect())
}

/// Check that every prerequisite outside `category` is available
pub fn check_requirements<T>(
    category: StrategyCategory,
    declared: &[Declared<T>],
    kind_of: impl Fn(&T) -> StrategyKind,
    available: &Available,
) -> Result<(), DefinitionError> {
    for entry in declared {
        for requirement in entry.requires.iter().filter(|r| r.category != category) {
            let present = available
                .get(&requirement.category)
                .map(|kinds| kinds.contains(&requirement.kind))
                .unwrap_or(false);
            if !present {
                return Err(DefinitionError::MissingDependency {
                    dependent: kind_of(&entry.strategy),
                    category: requirement.category,
                    required: requirement.kind,
                });
            }
        }
    }
    Ok(())
}

/// Find the index of the main strategy
pub fn main_index(
    category: StrategyCategory,
    kinds: &[StrategyKind],
    main: StrategyKind,
) -> Result<usize, DefinitionError> {
    kinds
        .iter()
        .position(|kind| *kind == main)
        .ok_or(DefinitionError::InvalidMainStrategy {
            category,
            kind: main,
        })
}
