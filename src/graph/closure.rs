//! Ontology closure of class URIs.
//!
//! The closure of a class is every class transitively reachable through two
//! relations: "is a domain of an object property whose range is this class"
//! (domains expanded with their subclasses) and "is a superclass of this
//! class". Closures never contain the class itself.
//!
//! Computation runs in two phases. An iterative depth-first expansion builds a
//! local closure per visited URI; whenever it meets a URI whose own expansion
//! is still open (a cycle) it records a dependency instead of recursing. A
//! fixpoint pass then relaxes the dependencies until no set grows, so every
//! member of a cycle ends up with the same closure whatever the entry point.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

use tracing::debug;

use super::error::GraphError;
use crate::ontology::{OntologyOracle, OracleError};

/// Direct connections of `uri` as reported by the oracle.
///
/// # Errors
///
/// Propagates oracle failures; they abort the closure computation.
pub fn direct_connections<O>(oracle: &O, uri: &str) -> Result<BTreeSet<String>, OracleError>
where
    O: OntologyOracle + ?Sized,
{
    let mut connections = oracle.domains_given_range(uri, true)?;
    connections.extend(oracle.super_classes(uri, false)?);
    Ok(connections)
}

struct Frame {
    uri: String,
    children: Vec<String>,
    next: usize,
}

/// Memoized closures keyed by class URI.
///
/// A slot is either unresolved (`None`) or holds the final closure. Slots are
/// created when a class node is registered and resolved on demand.
#[derive(Clone, Debug)]
pub struct UriClosures {
    cache: BTreeMap<String, Option<BTreeSet<String>>>,
    max_iterations: usize,
}

impl UriClosures {
    #[must_use]
    pub fn new(max_iterations: usize) -> Self {
        Self {
            cache: BTreeMap::new(),
            max_iterations: max_iterations.max(1),
        }
    }

    /// Creates an unresolved slot for `uri` unless one already exists.
    pub fn register(&mut self, uri: &str) {
        self.cache.entry(uri.to_string()).or_insert(None);
    }

    /// Cached closure of `uri`, if it has been computed.
    #[must_use]
    pub fn get(&self, uri: &str) -> Option<&BTreeSet<String>> {
        self.cache.get(uri).and_then(Option::as_ref)
    }

    #[must_use]
    pub fn is_resolved(&self, uri: &str) -> bool {
        self.get(uri).is_some()
    }

    /// Every URI with a slot, resolved or not.
    pub fn known_uris(&self) -> impl Iterator<Item = &str> {
        self.cache.keys().map(String::as_str)
    }

    /// Returns the closure of `uri`, computing it first when needed.
    ///
    /// # Errors
    ///
    /// Fails when the oracle cannot answer for a visited URI or when the
    /// fixpoint needs more closure-changing passes than its ceiling allows. The cache is left as it
    /// was in both cases.
    pub fn closure<O>(&mut self, oracle: &O, uri: &str) -> Result<BTreeSet<String>, GraphError>
    where
        O: OntologyOracle + ?Sized,
    {
        if let Some(closure) = self.get(uri) {
            return Ok(closure.clone());
        }
        self.compute(oracle, uri)?;
        Ok(self.get(uri).cloned().unwrap_or_default())
    }

    /// Recomputes every known closure from scratch.
    ///
    /// # Errors
    ///
    /// Stops at the first failing URI; slots not yet recomputed stay
    /// unresolved.
    pub fn reset<O>(&mut self, oracle: &O) -> Result<(), GraphError>
    where
        O: OntologyOracle + ?Sized,
    {
        let uris: Vec<String> = self.cache.keys().cloned().collect();
        for slot in self.cache.values_mut() {
            *slot = None;
        }
        for uri in &uris {
            if !self.is_resolved(uri) {
                self.compute(oracle, uri)?;
            }
        }
        debug!(closures = uris.len(), "closure_cache_reset");
        Ok(())
    }

    fn compute<O>(&mut self, oracle: &O, root: &str) -> Result<(), GraphError>
    where
        O: OntologyOracle + ?Sized,
    {
        let started = Instant::now();

        let mut local: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        let mut finished: BTreeSet<String> = BTreeSet::new();
        let mut pending: BTreeSet<String> = BTreeSet::new();
        let mut dependencies: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        let mut stack = vec![self.expand(oracle, root, &mut local)?];

        while let Some(frame) = stack.last_mut() {
            if frame.next < frame.children.len() {
                let child = frame.children[frame.next].clone();
                frame.next += 1;
                let uri = frame.uri.clone();

                if let Some(cached) = self.get(&child) {
                    local.entry(uri).or_default().extend(cached.iter().cloned());
                    continue;
                }

                if local.contains_key(&child) {
                    if finished.contains(&child) && !pending.contains(&child) {
                        let closure = local.get(&child).cloned().unwrap_or_default();
                        local.entry(uri).or_default().extend(closure);
                    } else {
                        dependencies.entry(uri.clone()).or_default().insert(child);
                        pending.insert(uri);
                    }
                    continue;
                }

                let frame = self.expand(oracle, &child, &mut local)?;
                stack.push(frame);
            } else {
                let Some(done) = stack.pop() else { break };
                finished.insert(done.uri.clone());
                if let Some(parent) = stack.last() {
                    let closure = local.get(&done.uri).cloned().unwrap_or_default();
                    local.entry(parent.uri.clone()).or_default().extend(closure);
                    if pending.contains(&done.uri) {
                        dependencies
                            .entry(parent.uri.clone())
                            .or_default()
                            .insert(done.uri);
                        pending.insert(parent.uri.clone());
                    }
                }
            }
        }

        let iterations = self.relax(root, &mut local, &dependencies)?;

        for (uri, mut closure) in local {
            closure.remove(&uri);
            self.cache.insert(uri, Some(closure));
        }

        debug!(
            uri = root,
            size = self.get(root).map_or(0, BTreeSet::len),
            cycles = dependencies.len(),
            iterations,
            elapsed_ms = started.elapsed().as_millis(),
            "closure_computed"
        );
        Ok(())
    }

    fn expand<O>(
        &self,
        oracle: &O,
        uri: &str,
        local: &mut BTreeMap<String, BTreeSet<String>>,
    ) -> Result<Frame, GraphError>
    where
        O: OntologyOracle + ?Sized,
    {
        let mut children = direct_connections(oracle, uri)?;
        children.remove(uri);
        local.insert(uri.to_string(), children.clone());
        Ok(Frame {
            uri: uri.to_string(),
            children: children.into_iter().collect(),
            next: 0,
        })
    }

    fn relax(
        &self,
        root: &str,
        local: &mut BTreeMap<String, BTreeSet<String>>,
        dependencies: &BTreeMap<String, BTreeSet<String>>,
    ) -> Result<usize, GraphError> {
        let mut iterations = 0;
        loop {
            let mut changed = false;
            for (uri, targets) in dependencies {
                for target in targets {
                    let mut addition = local.get(target).cloned().unwrap_or_default();
                    addition.insert(target.clone());
                    let closure = local.entry(uri.clone()).or_default();
                    let before = closure.len();
                    closure.extend(addition);
                    changed |= closure.len() != before;
                }
            }
            if !changed {
                return Ok(iterations);
            }
            iterations += 1;
            if iterations > self.max_iterations {
                return Err(GraphError::ClosureDidNotConverge {
                    uri: root.to_string(),
                    iterations,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::UriClosures;
    use crate::{config::ModelingSettings, graph::GraphError, tests_cfg};

    fn set(uris: &[&str]) -> BTreeSet<String> {
        uris.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn closure_follows_superclasses_and_domains() {
        let oracle = tests_cfg::end_to_end_oracle();
        let mut closures = UriClosures::new(100);
        let closure = closures
            .closure(&oracle, tests_cfg::X)
            .expect("closure computed");
        assert_eq!(closure, set(&[tests_cfg::Y, tests_cfg::Z]));
        assert!(closures.is_resolved(tests_cfg::Y));
    }

    #[test]
    fn register_never_clobbers_a_resolved_slot() {
        let oracle = tests_cfg::end_to_end_oracle();
        let mut closures = UriClosures::new(100);
        closures.closure(&oracle, tests_cfg::X).expect("computed");
        closures.register(tests_cfg::X);
        assert!(closures.is_resolved(tests_cfg::X));
    }

    #[test]
    fn unknown_terms_fail_without_caching() {
        let oracle = tests_cfg::end_to_end_oracle();
        let mut closures = UriClosures::new(100);
        closures.register("https://example.org/unknown#C");
        let err = closures
            .closure(&oracle, "https://example.org/unknown#C")
            .expect_err("oracle rejects the term");
        assert!(matches!(err, GraphError::Oracle(_)));
        assert!(!closures.is_resolved("https://example.org/unknown#C"));
    }

    #[test]
    fn cyclic_fragment_converges_to_the_same_set() {
        let oracle = tests_cfg::cyclic_oracle();
        for entry in [tests_cfg::A, tests_cfg::B, tests_cfg::C] {
            let mut closures = UriClosures::new(100);
            closures.closure(&oracle, entry).expect("computed");
            for member in [tests_cfg::A, tests_cfg::B, tests_cfg::C] {
                let mut expected = set(&[tests_cfg::A, tests_cfg::B, tests_cfg::C, tests_cfg::D]);
                expected.remove(member);
                assert_eq!(
                    closures.get(member),
                    Some(&expected),
                    "closure of {member} entering from {entry}"
                );
            }
        }
    }

    #[test]
    fn fixpoint_ceiling_aborts_without_caching() {
        let oracle = tests_cfg::cyclic_oracle();
        let mut closures = UriClosures::new(1);
        closures.register(tests_cfg::A);

        let err = closures
            .closure(&oracle, tests_cfg::A)
            .expect_err("the cycle needs two growing passes");
        assert!(matches!(
            err,
            GraphError::ClosureDidNotConverge { ref uri, iterations: 2 } if uri == tests_cfg::A
        ));
        for member in [tests_cfg::A, tests_cfg::B, tests_cfg::C, tests_cfg::D] {
            assert!(!closures.is_resolved(member), "{member}");
        }
    }

    #[test]
    fn fixpoint_ceiling_counts_growing_passes_only() {
        let oracle = tests_cfg::cyclic_oracle();
        let expected = set(&[tests_cfg::B, tests_cfg::C, tests_cfg::D]);

        let mut closures = UriClosures::new(2);
        let closure = closures
            .closure(&oracle, tests_cfg::A)
            .expect("ceiling of two");
        assert_eq!(closure, expected);

        let ceiling = ModelingSettings::default().closure_max_iterations;
        let mut closures = UriClosures::new(ceiling);
        let closure = closures
            .closure(&oracle, tests_cfg::A)
            .expect("default ceiling");
        assert_eq!(closure, expected);
    }

    #[test]
    fn reset_recomputes_known_uris() {
        let oracle = tests_cfg::cyclic_oracle();
        let mut closures = UriClosures::new(100);
        closures.register(tests_cfg::A);
        closures.register(tests_cfg::D);
        closures.reset(&oracle).expect("reset");
        assert!(closures.is_resolved(tests_cfg::A));
        assert_eq!(closures.get(tests_cfg::D), Some(&BTreeSet::new()));
    }
}
