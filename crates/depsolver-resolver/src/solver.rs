//! Backtracking search over package versions.
//!
//! Each package in the reachable closure has a domain of candidate versions,
//! newest first. Selecting a version narrows the domains of its dependency
//! targets (forward checking) and marks them required. The pending package
//! with the fewest candidates is decided next, ties broken by name, and its
//! candidates are tried newest first. Undo information lives on a trail so
//! backtracking restores exactly what a selection changed.

use std::collections::BTreeMap;
use std::mem;
use std::time::{Duration, Instant};

use crate::conflict::{ConflictTracker, ResolutionFailure};
use crate::graph::{DependencyGraph, PackageId, SolutionConstraint, VersionId};
use crate::trim::{path_between, trim};
use crate::version::Version;

/// Selected version per package name.
pub type Solution = BTreeMap<String, Version>;

/// Search steps between two clock reads.
const DEADLINE_CHECK_INTERVAL: u64 = 64;

/// Wall-clock budget for a search, polled every
/// [`DEADLINE_CHECK_INTERVAL`] steps.
#[derive(Debug, Clone)]
pub struct Deadline {
    at: Option<Instant>,
    ticks: u64,
}

impl Deadline {
    /// A deadline `timeout` from now. Timeouts too large to represent never
    /// expire.
    pub fn after(timeout: Duration) -> Self {
        Self {
            at: Instant::now().checked_add(timeout),
            ticks: 0,
        }
    }

    pub fn expired(&self) -> bool {
        self.at.is_some_and(|at| Instant::now() >= at)
    }

    /// Count one search step, reading the clock only every few steps.
    fn tick(&mut self) -> bool {
        self.ticks += 1;
        self.ticks % DEADLINE_CHECK_INTERVAL == 0 && self.expired()
    }
}

enum Undo {
    Domain(PackageId, Vec<VersionId>),
    Assign(PackageId),
    Require(PackageId),
}

/// One decision level: the candidates of `package` and the next to try.
struct Frame {
    package: PackageId,
    candidates: Vec<VersionId>,
    next: usize,
    mark: usize,
}

/// Mutable state of one search over one run list.
struct Search<'g> {
    graph: &'g DependencyGraph,
    /// Reachable packages sorted by name.
    closure: Vec<PackageId>,
    /// Position of each package in `closure`, `None` outside it.
    rank: Vec<Option<usize>>,
    domains: Vec<Vec<VersionId>>,
    assigned: Vec<Option<VersionId>>,
    required: Vec<bool>,
    /// Required packages without a selected version.
    pending: Vec<PackageId>,
    trail: Vec<Undo>,
    conflicts: ConflictTracker,
    trace: bool,
}

impl<'g> Search<'g> {
    fn new(graph: &'g DependencyGraph, run_list: &[SolutionConstraint], trace: bool) -> Self {
        let n = graph.package_count();
        let closure = trim(graph, run_list);
        let mut search = Self {
            graph,
            closure: Vec::new(),
            rank: vec![None; n],
            domains: vec![Vec::new(); n],
            assigned: vec![None; n],
            required: vec![false; n],
            pending: Vec::new(),
            trail: Vec::new(),
            conflicts: ConflictTracker::new(),
            trace,
        };

        for (pos, &id) in closure.iter().enumerate() {
            search.rank[id.index()] = Some(pos);
            search.domains[id.index()] = graph.versions_newest_first(id);
        }
        search.closure = closure;

        for constraint in run_list {
            let slot = constraint.package.index();
            if !search.required[slot] {
                search.required[slot] = true;
                search.pending.push(constraint.package);
            }
            search.domains[slot]
                .retain(|&vid| constraint.constraint.satisfies(&graph.version(vid).version));
            if search.domains[slot].is_empty() {
                search.conflicts.record_emptied(constraint.package);
            }
        }
        search
    }

    /// Pending package with the smallest domain, ties broken by name.
    fn pick(&self) -> Option<PackageId> {
        self.pending
            .iter()
            .copied()
            .min_by_key(|id| (self.domains[id.index()].len(), self.rank[id.index()]))
    }

    /// Depth-first search over an explicit stack of frames. Every frame
    /// undoes back to its mark before trying its next candidate.
    fn run(&mut self, deadline: &mut Deadline) -> Result<bool, ResolutionFailure> {
        let mut stack: Vec<Frame> = Vec::new();

        loop {
            let Some(package) = self.pick() else {
                return Ok(true);
            };
            let candidates = self.domains[package.index()].clone();
            if candidates.is_empty() {
                self.conflicts.record_emptied(package);
            } else {
                stack.push(Frame {
                    package,
                    candidates,
                    next: 0,
                    mark: self.trail.len(),
                });
            }

            // Advance to the next candidate that activates, popping
            // exhausted frames on the way.
            loop {
                let Some(frame) = stack.last_mut() else {
                    return Ok(false);
                };
                self.undo_to(frame.mark);
                let Some(&vid) = frame.candidates.get(frame.next) else {
                    stack.pop();
                    continue;
                };
                frame.next += 1;
                let package = frame.package;

                if deadline.tick() {
                    return Err(ResolutionFailure::ResolutionTimeout);
                }
                if self.trace {
                    tracing::trace!(
                        "try {} {} (depth {})",
                        self.graph.name(package),
                        self.graph.version(vid).version,
                        stack.len()
                    );
                }
                if self.activate(package, vid) {
                    break;
                }
            }
        }
    }

    /// Select `vid` for `package` and propagate its dependency constraints.
    /// Returns `false` when some target is left without candidates.
    fn activate(&mut self, package: PackageId, vid: VersionId) -> bool {
        let graph = self.graph;
        self.assigned[package.index()] = Some(vid);
        self.pending.retain(|&id| id != package);
        self.trail.push(Undo::Assign(package));

        for dep in &graph.version(vid).dependencies {
            let target = dep.package;
            let slot = target.index();

            if !graph.get(target).declared {
                self.conflicts.record_non_existent(target);
                return false;
            }

            if let Some(chosen) = self.assigned[slot] {
                if !dep.constraint.satisfies(&graph.version(chosen).version) {
                    self.conflicts.record_emptied(target);
                    return false;
                }
                continue;
            }

            let narrowed: Vec<VersionId> = self.domains[slot]
                .iter()
                .copied()
                .filter(|&v| dep.constraint.satisfies(&graph.version(v).version))
                .collect();
            if narrowed.is_empty() {
                if self.trace {
                    tracing::trace!(
                        "{} {} leaves no candidates for {}",
                        graph.name(package),
                        graph.version(vid).version,
                        graph.name(target)
                    );
                }
                self.conflicts.record_emptied(target);
                return false;
            }
            if narrowed.len() != self.domains[slot].len() {
                let old = mem::replace(&mut self.domains[slot], narrowed);
                self.trail.push(Undo::Domain(target, old));
            }
            if !self.required[slot] {
                self.required[slot] = true;
                self.pending.push(target);
                self.trail.push(Undo::Require(target));
            }
        }
        true
    }

    fn undo_to(&mut self, mark: usize) {
        while self.trail.len() > mark {
            match self.trail.pop() {
                Some(Undo::Domain(id, old)) => self.domains[id.index()] = old,
                Some(Undo::Assign(id)) => {
                    self.assigned[id.index()] = None;
                    self.pending.push(id);
                }
                Some(Undo::Require(id)) => {
                    self.required[id.index()] = false;
                    self.pending.retain(|&p| p != id);
                }
                None => break,
            }
        }
    }

    fn solution(&self) -> Solution {
        self.closure
            .iter()
            .filter_map(|&id| {
                self.assigned[id.index()]
                    .map(|vid| (self.graph.name(id).to_string(), self.graph.version(vid).version))
            })
            .collect()
    }
}

/// Runs searches against one dependency graph under a shared deadline.
pub struct Selector<'g> {
    graph: &'g DependencyGraph,
    deadline: Deadline,
    trace: bool,
}

impl<'g> Selector<'g> {
    pub fn new(graph: &'g DependencyGraph, timeout: Duration) -> Self {
        Self {
            graph,
            deadline: Deadline::after(timeout),
            trace: false,
        }
    }

    /// Emit a trace event for every candidate tried.
    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    /// Find a version for every package the run list activates.
    pub fn find_solution(
        &mut self,
        run_list: &[SolutionConstraint],
    ) -> Result<Solution, ResolutionFailure> {
        self.validate(run_list)?;

        if self.deadline.expired() {
            return Err(ResolutionFailure::ResolutionTimeout);
        }

        let mut search = Search::new(self.graph, run_list, self.trace);
        if search.run(&mut self.deadline)? {
            let solution = search.solution();
            tracing::debug!("found solution for {} packages", solution.len());
            return Ok(solution);
        }

        Err(self.diagnose(run_list, search.conflicts)?)
    }

    /// Reject run list entries naming undeclared packages or asking for
    /// versions that no surviving version satisfies.
    fn validate(&self, run_list: &[SolutionConstraint]) -> Result<(), ResolutionFailure> {
        let graph = self.graph;
        let mut non_existent: Vec<String> = Vec::new();
        let mut constraints_not_met: Vec<String> = Vec::new();

        for constraint in run_list {
            let package = graph.get(constraint.package);
            if !package.declared {
                if !non_existent.contains(&constraint.name) {
                    non_existent.push(constraint.name.clone());
                }
                continue;
            }
            let satisfiable = package
                .versions
                .iter()
                .any(|&vid| constraint.constraint.satisfies(&graph.version(vid).version));
            if !satisfiable {
                constraints_not_met.push(constraint.to_string());
            }
        }

        if non_existent.is_empty() && constraints_not_met.is_empty() {
            Ok(())
        } else {
            Err(ResolutionFailure::InvalidConstraints {
                non_existent,
                constraints_not_met,
            })
        }
    }

    /// Explain an exhausted search. Growing prefixes of the run list are
    /// solved until one fails; its last entry is the unsatisfiable item.
    fn diagnose(
        &mut self,
        run_list: &[SolutionConstraint],
        full: ConflictTracker,
    ) -> Result<ResolutionFailure, ResolutionFailure> {
        let mut culprit = run_list.len().saturating_sub(1);
        let mut conflicts = full;

        for end in 1..run_list.len() {
            let mut search = Search::new(self.graph, &run_list[..end], false);
            if !search.run(&mut self.deadline)? {
                culprit = end - 1;
                conflicts = search.conflicts;
                break;
            }
        }

        let Some(item) = run_list.get(culprit) else {
            return Ok(ResolutionFailure::Internal {
                message: "search failed on an empty run list".to_string(),
            });
        };

        let non_existent = conflicts.non_existent(self.graph);
        let most_constrained = conflicts.most_constrained(self.graph);
        let message = self.explain(item, &conflicts, &non_existent);
        tracing::debug!("no solution: {message}");

        Ok(ResolutionFailure::NoSolutionExists {
            message,
            unsatisfiable_run_list_item: Some(item.to_string()),
            non_existent,
            most_constrained,
        })
    }

    fn explain(
        &self,
        item: &SolutionConstraint,
        conflicts: &ConflictTracker,
        non_existent: &[String],
    ) -> String {
        let graph = self.graph;
        let (target, missing) = match non_existent.first() {
            Some(name) => (graph.find(name), true),
            None => (conflicts.ranked(graph).first().copied(), false),
        };

        let Some(target) = target else {
            return format!("Unable to satisfy solution constraint ({item})");
        };

        let mut chain = format!("({item})");
        if let Some(path) = path_between(graph, item.package, target) {
            for id in path.into_iter().skip(1) {
                chain.push_str(" -> ");
                chain.push_str(graph.name(id));
            }
        }

        let name = graph.name(target);
        let existence = if missing { ", which does not exist," } else { "" };
        format!(
            "Unable to satisfy constraints on package {name}{existence} due to solution \
             constraint ({item}). Solution constraints that may result in a constraint \
             on {name}: [{chain}]"
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::VersionConstraint;
    use crate::filter::EnvironmentConstraints;
    use depsolver_core::universe::{Universe, VersionEntry};

    type Entry<'a> = (&'a str, &'a str, &'a [(&'a str, &'a str)]);

    fn graph(entries: &[Entry<'_>]) -> DependencyGraph {
        let mut u = Universe::new();
        for (name, version, deps) in entries {
            u.entry(name.to_string()).or_default().insert(
                version.to_string(),
                VersionEntry::with_dependencies(deps.iter().copied()),
            );
        }
        DependencyGraph::from_universe(&u, &EnvironmentConstraints::default()).unwrap()
    }

    fn requests(g: &mut DependencyGraph, items: &[(&str, &str)]) -> Vec<SolutionConstraint> {
        items
            .iter()
            .map(|(name, c)| g.solution_constraint(name, VersionConstraint::parse(c).unwrap()))
            .collect()
    }

    fn solve(g: &DependencyGraph, rl: &[SolutionConstraint]) -> Result<Solution, ResolutionFailure> {
        Selector::new(g, Duration::from_secs(5)).find_solution(rl)
    }

    fn rendered(solution: &Solution) -> Vec<(String, String)> {
        solution
            .iter()
            .map(|(k, v)| (k.clone(), v.to_string()))
            .collect()
    }

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(a, b)| (a.to_string(), b.to_string()))
            .collect()
    }

    #[test]
    fn latest_version_wins() {
        let mut g = graph(&[
            ("A", "1.0.0", &[("B", ">= 2.0.0")]),
            ("A", "1.1.0", &[("B", ">= 2.0.0")]),
            ("B", "1.0.0", &[]),
            ("B", "2.0.0", &[]),
        ]);
        let rl = requests(&mut g, &[("A", "")]);
        let solution = solve(&g, &rl).unwrap();
        assert_eq!(rendered(&solution), pairs(&[("A", "1.1.0"), ("B", "2.0.0")]));
    }

    #[test]
    fn pinned_version_not_available() {
        let mut g = graph(&[("A", "1.0.0", &[])]);
        let rl = requests(&mut g, &[("A", "= 9.9.9")]);
        assert_eq!(
            solve(&g, &rl).unwrap_err(),
            ResolutionFailure::InvalidConstraints {
                non_existent: vec![],
                constraints_not_met: vec!["A = 9.9.9".to_string()],
            }
        );
    }

    #[test]
    fn unknown_run_list_package() {
        let mut g = graph(&[("A", "1.0.0", &[])]);
        let rl = requests(&mut g, &[("A", ""), ("Z", ""), ("Y", "= 1.0.0")]);
        assert_eq!(
            solve(&g, &rl).unwrap_err(),
            ResolutionFailure::InvalidConstraints {
                non_existent: vec!["Z".to_string(), "Y".to_string()],
                constraints_not_met: vec![],
            }
        );
    }

    #[test]
    fn both_invalid_lists_are_reported_together() {
        let mut g = graph(&[("A", "1.0.0", &[])]);
        let rl = requests(&mut g, &[("Z", ""), ("A", "> 1.0.0")]);
        let ResolutionFailure::InvalidConstraints {
            non_existent,
            constraints_not_met,
        } = solve(&g, &rl).unwrap_err()
        else {
            panic!("expected invalid constraints");
        };
        assert_eq!(non_existent, vec!["Z"]);
        assert_eq!(constraints_not_met, vec!["A > 1.0.0"]);
    }

    #[test]
    fn zero_timeout_times_out() {
        let mut g = graph(&[("A", "1.0.0", &[])]);
        let rl = requests(&mut g, &[("A", "")]);
        let err = Selector::new(&g, Duration::ZERO)
            .find_solution(&rl)
            .unwrap_err();
        assert_eq!(err, ResolutionFailure::ResolutionTimeout);
    }

    #[test]
    fn deadline_polling() {
        let mut deadline = Deadline::after(Duration::ZERO);
        assert!(deadline.expired());
        for _ in 1..DEADLINE_CHECK_INTERVAL {
            assert!(!deadline.tick());
        }
        assert!(deadline.tick());

        let far = Deadline::after(Duration::MAX);
        assert!(!far.expired());
    }

    #[test]
    fn deadline_expires_during_search() {
        let mut u = Universe::new();
        let mut root_deps: Vec<(String, String)> = Vec::new();
        for i in 0..40 {
            let name = format!("x{i:02}");
            for version in ["1.0.0", "2.0.0"] {
                u.entry(name.clone())
                    .or_default()
                    .insert(version.to_string(), VersionEntry::default());
            }
            root_deps.push((name, ">= 0.0.0".to_string()));
        }
        root_deps.push(("zbad".to_string(), ">= 0.0.0".to_string()));
        u.entry("root".to_string())
            .or_default()
            .insert("1.0.0".to_string(), VersionEntry::with_dependencies(root_deps));
        for version in ["1.0.0", "2.0.0", "3.0.0"] {
            u.entry("zbad".to_string()).or_default().insert(
                version.to_string(),
                VersionEntry::with_dependencies([("ghost2", "= 9.0.0")]),
            );
        }
        u.entry("ghost2".to_string())
            .or_default()
            .insert("1.0.0".to_string(), VersionEntry::default());

        let mut g = DependencyGraph::from_universe(&u, &EnvironmentConstraints::default()).unwrap();
        let rl = requests(&mut g, &[("root", "")]);

        let started = Instant::now();
        let err = Selector::new(&g, Duration::from_millis(200))
            .find_solution(&rl)
            .unwrap_err();
        assert_eq!(err, ResolutionFailure::ResolutionTimeout);
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn long_dependency_chain_solves() {
        const LEN: usize = 20_000;
        let mut u = Universe::new();
        for i in 0..LEN {
            let entry = if i + 1 < LEN {
                VersionEntry::with_dependencies([(format!("p{:05}", i + 1), "= 1.0.0")])
            } else {
                VersionEntry::default()
            };
            u.entry(format!("p{i:05}"))
                .or_default()
                .insert("1.0.0".to_string(), entry);
        }
        let mut g = DependencyGraph::from_universe(&u, &EnvironmentConstraints::default()).unwrap();
        let rl = requests(&mut g, &[("p00000", "")]);

        let solution = Selector::new(&g, Duration::from_secs(60))
            .find_solution(&rl)
            .unwrap();
        assert_eq!(solution.len(), LEN);
        assert_eq!(solution["p19999"].to_string(), "1.0.0");
    }

    #[test]
    fn backtracks_to_older_version() {
        let mut g = graph(&[
            ("A", "2.0.0", &[("B", "= 1.0.0")]),
            ("A", "1.0.0", &[("B", ">= 0.0.0")]),
            ("B", "1.0.0", &[("C", "= 9.0.0")]),
            ("B", "2.0.0", &[]),
            ("C", "1.0.0", &[]),
        ]);
        let rl = requests(&mut g, &[("A", "")]);
        let solution = solve(&g, &rl).unwrap();
        assert_eq!(rendered(&solution), pairs(&[("A", "1.0.0"), ("B", "2.0.0")]));
    }

    #[test]
    fn unselected_versions_do_not_constrain() {
        let mut g = graph(&[
            ("A", "2.0.0", &[("ghost", ">= 0.0.0")]),
            ("A", "1.0.0", &[]),
        ]);
        let rl = requests(&mut g, &[("A", "")]);
        let solution = solve(&g, &rl).unwrap();
        assert_eq!(rendered(&solution), pairs(&[("A", "1.0.0")]));
    }

    #[test]
    fn cycles_resolve() {
        let mut g = graph(&[
            ("A", "1.0.0", &[("B", ">= 0.0.0")]),
            ("B", "1.0.0", &[("A", "= 1.0.0")]),
        ]);
        let rl = requests(&mut g, &[("A", "")]);
        let solution = solve(&g, &rl).unwrap();
        assert_eq!(rendered(&solution), pairs(&[("A", "1.0.0"), ("B", "1.0.0")]));
    }

    #[test]
    fn repeated_requests_intersect() {
        let mut g = graph(&[("A", "1.0.0", &[]), ("A", "2.0.0", &[])]);
        let rl = requests(&mut g, &[("A", ""), ("A", "= 1.0.0")]);
        let solution = solve(&g, &rl).unwrap();
        assert_eq!(rendered(&solution), pairs(&[("A", "1.0.0")]));
    }

    #[test]
    fn results_are_deterministic() {
        let entries: &[Entry<'_>] = &[
            ("app", "1.0.0", &[("web", "~> 1.0"), ("db", ">= 1.0")]),
            ("app", "1.1.0", &[("web", "~> 2.0"), ("db", ">= 2.0")]),
            ("web", "1.0.0", &[]),
            ("web", "1.5.0", &[("db", "< 3.0")]),
            ("web", "2.0.0", &[("db", "< 2.0")]),
            ("db", "1.0.0", &[]),
            ("db", "2.0.0", &[]),
            ("db", "3.0.0", &[]),
        ];
        let mut g = graph(entries);
        let rl = requests(&mut g, &[("app", "")]);
        let first = solve(&g, &rl).unwrap();
        for _ in 0..5 {
            let mut again = graph(entries);
            let rl = requests(&mut again, &[("app", "")]);
            assert_eq!(solve(&again, &rl).unwrap(), first);
        }
        assert_eq!(
            rendered(&first),
            pairs(&[("app", "1.0.0"), ("db", "2.0.0"), ("web", "1.5.0")])
        );
    }

    #[test]
    fn no_solution_names_the_constrained_package() {
        let mut g = graph(&[
            ("A", "1.0.0", &[("B", "= 2.0.0")]),
            ("B", "1.0.0", &[]),
        ]);
        let rl = requests(&mut g, &[("A", "")]);
        let err = solve(&g, &rl).unwrap_err();
        assert_eq!(
            err,
            ResolutionFailure::NoSolutionExists {
                message: "Unable to satisfy constraints on package B due to solution constraint \
                          (A >= 0.0.0). Solution constraints that may result in a constraint on \
                          B: [(A >= 0.0.0) -> B]"
                    .to_string(),
                unsatisfiable_run_list_item: Some("A >= 0.0.0".to_string()),
                non_existent: vec![],
                most_constrained: vec!["B = 1.0.0".to_string()],
            }
        );
    }

    #[test]
    fn no_solution_reports_missing_dependency() {
        let mut g = graph(&[("A", "1.0.0", &[("ghost", ">= 1.0.0")])]);
        let rl = requests(&mut g, &[("A", "")]);
        let ResolutionFailure::NoSolutionExists {
            message,
            non_existent,
            ..
        } = solve(&g, &rl).unwrap_err()
        else {
            panic!("expected no solution");
        };
        assert_eq!(non_existent, vec!["ghost"]);
        assert!(message.contains("package ghost, which does not exist,"));
        assert!(message.ends_with("[(A >= 0.0.0) -> ghost]"));
    }

    #[test]
    fn first_failing_prefix_names_the_item() {
        let mut g = graph(&[
            ("ok", "1.0.0", &[]),
            ("A", "1.0.0", &[]),
            ("A", "2.0.0", &[]),
        ]);
        let rl = requests(&mut g, &[("ok", ""), ("A", "= 1.0.0"), ("A", "= 2.0.0")]);
        let ResolutionFailure::NoSolutionExists {
            unsatisfiable_run_list_item,
            most_constrained,
            message,
            ..
        } = solve(&g, &rl).unwrap_err()
        else {
            panic!("expected no solution");
        };
        assert_eq!(unsatisfiable_run_list_item.as_deref(), Some("A = 2.0.0"));
        assert_eq!(most_constrained, vec!["A = 2.0.0"]);
        assert!(message.ends_with("[(A = 2.0.0)]"));
    }

    #[test]
    fn environment_filtered_dependency_is_constrained() {
        let mut u = Universe::new();
        u.entry("A".into()).or_default().insert(
            "1.0.0".into(),
            VersionEntry::with_dependencies([("B", ">= 0.0.0")]),
        );
        u.entry("B".into())
            .or_default()
            .insert("1.0.0".into(), VersionEntry::default());
        let env = EnvironmentConstraints::from_pairs([("B", "> 1.0.0")]).unwrap();
        let mut g = DependencyGraph::from_universe(&u, &env).unwrap();
        let rl = requests(&mut g, &[("A", "")]);
        let ResolutionFailure::NoSolutionExists {
            non_existent,
            most_constrained,
            ..
        } = solve(&g, &rl).unwrap_err()
        else {
            panic!("expected no solution");
        };
        assert!(non_existent.is_empty());
        assert_eq!(most_constrained, vec!["B"]);
    }
}
