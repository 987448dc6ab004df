//! Resource dependency graph.
//!
//! Edges come from two sources:
//! 1. **Declared dependencies**: a resource's `DependsOn` list
//! 2. **Embedded references**: `Ref`, `Fn::GetAtt` and `Fn::Sub` placeholders
//!    in a resource's properties that name another resource
//!
//! Only resource-to-resource edges are tracked; references to parameters and
//! pseudo-parameters never create ordering constraints.

use std::collections::{BTreeSet, HashMap};

use indexmap::IndexMap;

use crate::error::TemplateError;
use crate::template::Template;
use crate::types::{EntityKind, ReferenceKind};

/// Why one resource must be created after another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DependencyEdge {
    DependsOn,
    Ref,
    GetAtt,
    Sub,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Done,
}

/// Adjacency list over resources: resource -> [(dependency, edge)], both in
/// template insertion order.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    edges: IndexMap<String, Vec<(String, DependencyEdge)>>,
}

impl DependencyGraph {
    pub fn from_template(template: &Template) -> Self {
        let mut graph = DependencyGraph::default();

        for (name, resource) in template.resources() {
            graph.edges.insert(name.to_string(), Vec::new());

            for dependency in resource.dependencies() {
                graph.add_edge(template, name, dependency, DependencyEdge::DependsOn);
            }

            for value in resource.properties().values() {
                for reference in value.references() {
                    let edge = match reference.kind {
                        ReferenceKind::Ref => DependencyEdge::Ref,
                        ReferenceKind::GetAtt => DependencyEdge::GetAtt,
                        ReferenceKind::Sub => DependencyEdge::Sub,
                        ReferenceKind::Condition | ReferenceKind::DependsOn => continue,
                    };
                    graph.add_edge(template, name, &reference.name, edge);
                }
            }
        }

        graph
    }

    fn add_edge(&mut self, template: &Template, from: &str, to: &str, edge: DependencyEdge) {
        if template.entity(to).map(|e| e.kind()) != Some(EntityKind::Resource) {
            return;
        }
        let Some(deps) = self.edges.get_mut(from) else {
            return;
        };
        if deps.iter().all(|(existing, _)| existing != to) {
            deps.push((to.to_string(), edge));
        }
    }

    /// Resource names in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.edges.keys().map(String::as_str)
    }

    /// The resources `name` must be created after, with the edge that introduced each.
    pub fn dependencies_of(&self, name: &str) -> &[(String, DependencyEdge)] {
        self.edges.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn edge_count(&self) -> usize {
        self.edges.values().map(Vec::len).sum()
    }

    /// Find a dependency cycle with a depth-first search, visiting resources in
    /// insertion order. The returned path starts and ends with the same name.
    pub fn find_cycle(&self) -> Option<Vec<String>> {
        let mut marks: HashMap<&str, Mark> = HashMap::new();
        let mut stack: Vec<&str> = Vec::new();

        for node in self.edges.keys() {
            if let Some(cycle) = self.visit(node, &mut marks, &mut stack) {
                return Some(cycle);
            }
        }
        None
    }

    fn visit<'a>(
        &'a self,
        node: &'a str,
        marks: &mut HashMap<&'a str, Mark>,
        stack: &mut Vec<&'a str>,
    ) -> Option<Vec<String>> {
        match marks.get(node) {
            Some(Mark::Done) => return None,
            Some(Mark::Visiting) => {
                let start = stack.iter().position(|n| *n == node).unwrap_or(0);
                let mut cycle: Vec<String> = stack[start..].iter().map(|n| n.to_string()).collect();
                cycle.push(node.to_string());
                return Some(cycle);
            }
            None => {}
        }

        marks.insert(node, Mark::Visiting);
        stack.push(node);
        for (dependency, _) in self.dependencies_of(node) {
            if let Some(cycle) = self.visit(dependency, marks, stack) {
                return Some(cycle);
            }
        }
        stack.pop();
        marks.insert(node, Mark::Done);
        None
    }

    /// Creation order via topological sort: every resource comes after its
    /// dependencies; ties are broken by insertion order.
    pub fn creation_order(&self) -> Result<Vec<String>, TemplateError> {
        let index: HashMap<&str, usize> = self
            .edges
            .keys()
            .enumerate()
            .map(|(i, name)| (name.as_str(), i))
            .collect();

        let mut in_degree: Vec<usize> = vec![0; self.edges.len()];
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); self.edges.len()];
        for (i, deps) in self.edges.values().enumerate() {
            for (dependency, _) in deps {
                if let Some(&d) = index.get(dependency.as_str()) {
                    in_degree[i] += 1;
                    dependents[d].push(i);
                }
            }
        }

        // Kahn's algorithm
        let mut ready: BTreeSet<usize> = in_degree
            .iter()
            .enumerate()
            .filter(|(_, degree)| **degree == 0)
            .map(|(i, _)| i)
            .collect();
        let mut order = Vec::with_capacity(self.edges.len());

        while let Some(next) = ready.pop_first() {
            order.push(next);
            for &dependent in &dependents[next] {
                in_degree[dependent] -= 1;
                if in_degree[dependent] == 0 {
                    ready.insert(dependent);
                }
            }
        }

        if order.len() != self.edges.len() {
            let path = self.find_cycle().unwrap_or_default();
            return Err(TemplateError::CyclicDependency { path });
        }

        let names: Vec<&String> = self.edges.keys().collect();
        Ok(order.into_iter().map(|i| names[i].clone()).collect())
    }
}
