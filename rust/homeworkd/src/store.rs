use crate::config::WritePolicy;
use crate::ids::IdGenerator;
use crate::model::{Assignment, AssignmentPatch, NewAssignment};
use crate::storage::KeyValueStore;
use anyhow::{anyhow, Context};
use tracing::{debug, error, warn};

pub const ASSIGNMENTS_KEY: &str = "homework-tracker-assignments";

// A generator that keeps colliding is broken; stop instead of spinning.
const MAX_ID_ATTEMPTS: usize = 16;

/// Canonical assignment list, mirrored in full to `ASSIGNMENTS_KEY` after every mutation.
pub struct AssignmentStore<S, G> {
    storage: S,
    ids: G,
    policy: WritePolicy,
    assignments: Vec<Assignment>,
}

impl<S: KeyValueStore, G: IdGenerator> AssignmentStore<S, G> {
    /// Never fails: unreadable or malformed persisted data starts an empty list.
    pub fn initialize(storage: S, ids: G, policy: WritePolicy) -> Self {
        let assignments = load_persisted(&storage);
        Self {
            storage,
            ids,
            policy,
            assignments,
        }
    }

    pub fn list(&self) -> &[Assignment] {
        &self.assignments
    }

    pub fn get(&self, id: &str) -> Option<&Assignment> {
        self.assignments.iter().find(|a| a.id == id)
    }

    pub fn policy(&self) -> WritePolicy {
        self.policy
    }

    /// Appends with a fresh id. The caller is responsible for validation.
    pub fn add(&mut self, new: NewAssignment) -> anyhow::Result<Assignment> {
        let id = self.fresh_id()?;
        let assignment = new.into_assignment(id);
        debug!(id = %assignment.id, class = %assignment.class_name, "assignment added");
        let created = assignment.clone();
        self.mutate(move |list| list.push(assignment))?;
        Ok(created)
    }

    /// Returns whether a record matched. A missing id is not an error.
    pub fn update(&mut self, id: &str, patch: AssignmentPatch) -> anyhow::Result<bool> {
        let found = self.mutate(|list| match list.iter_mut().find(|a| a.id == id) {
            Some(a) => {
                a.apply(patch);
                true
            }
            None => false,
        })?;
        debug!(id, found, "assignment updated");
        Ok(found)
    }

    /// Returns whether a record was removed. A missing id is not an error.
    pub fn delete(&mut self, id: &str) -> anyhow::Result<bool> {
        let removed = self.mutate(|list| {
            let before = list.len();
            list.retain(|a| a.id != id);
            list.len() != before
        })?;
        debug!(id, removed, "assignment deleted");
        Ok(removed)
    }

    fn fresh_id(&mut self) -> anyhow::Result<String> {
        for _ in 0..MAX_ID_ATTEMPTS {
            let id = self.ids.next_id();
            if self.get(&id).is_none() {
                return Ok(id);
            }
            debug!(id, "generated id already in use; drawing again");
        }
        Err(anyhow!(
            "id generator produced {} colliding ids in a row",
            MAX_ID_ATTEMPTS
        ))
    }

    fn mutate<T>(&mut self, op: impl FnOnce(&mut Vec<Assignment>) -> T) -> anyhow::Result<T> {
        let snapshot = match self.policy {
            WritePolicy::Strict => Some(self.assignments.clone()),
            WritePolicy::BestEffort => None,
        };
        let out = op(&mut self.assignments);
        if let Err(e) = self.persist() {
            match snapshot {
                Some(previous) => {
                    self.assignments = previous;
                    return Err(e);
                }
                None => {
                    error!(
                        error = %format!("{e:#}"),
                        "failed to persist assignments; keeping in-memory change"
                    );
                }
            }
        }
        Ok(out)
    }

    fn persist(&self) -> anyhow::Result<()> {
        let raw =
            serde_json::to_string(&self.assignments).context("failed to serialize assignments")?;
        self.storage
            .set(ASSIGNMENTS_KEY, &raw)
            .context("failed to write assignments")
    }
}

fn load_persisted<S: KeyValueStore>(storage: &S) -> Vec<Assignment> {
    let raw = match storage.get(ASSIGNMENTS_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            warn!(error = %format!("{e:#}"), "error loading assignments; starting empty");
            return Vec::new();
        }
    };
    match serde_json::from_str::<Vec<Assignment>>(&raw) {
        Ok(list) => list,
        Err(e) => {
            warn!(error = %e, "error loading assignments; starting empty");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::testing::{ScriptedIds, SequentialIds};
    use crate::storage::memory::MemoryKv;
    use proptest::prelude::*;
    use std::rc::Rc;

    type TestStore = AssignmentStore<Rc<MemoryKv>, SequentialIds>;

    fn store(policy: WritePolicy) -> (Rc<MemoryKv>, TestStore) {
        let kv = Rc::new(MemoryKv::default());
        let s = AssignmentStore::initialize(kv.clone(), SequentialIds::default(), policy);
        (kv, s)
    }

    fn new(class: &str, name: &str) -> NewAssignment {
        NewAssignment {
            class_name: class.into(),
            assignment_name: name.into(),
            ..NewAssignment::default()
        }
    }

    fn persisted(kv: &MemoryKv) -> Vec<Assignment> {
        let raw = kv.raw(ASSIGNMENTS_KEY).expect("persisted list");
        serde_json::from_str(&raw).expect("parse persisted list")
    }

    #[test]
    fn add_to_empty_store_assigns_fresh_id() {
        let (kv, mut s) = store(WritePolicy::BestEffort);
        let created = s.add(new("Math", "HW1")).expect("add");
        assert_eq!(s.list().len(), 1);
        assert_eq!(s.list()[0], created);
        assert!(!created.id.is_empty());
        assert!(!created.completed);
        assert_eq!(persisted(&kv), s.list());
    }

    #[test]
    fn add_redraws_colliding_ids() {
        let kv = Rc::new(MemoryKv::default());
        let mut s = AssignmentStore::initialize(
            kv,
            ScriptedIds::new(&["x", "x", "x", "y"]),
            WritePolicy::BestEffort,
        );
        assert_eq!(s.add(new("Math", "HW1")).expect("first").id, "x");
        assert_eq!(s.add(new("Math", "HW2")).expect("second").id, "y");
    }

    #[test]
    fn add_gives_up_on_a_stuck_generator() {
        let kv = Rc::new(MemoryKv::default());
        let mut s =
            AssignmentStore::initialize(kv, ScriptedIds::new(&["x"]), WritePolicy::BestEffort);
        s.add(new("Math", "HW1")).expect("first");
        assert!(s.add(new("Math", "HW2")).is_err());
        assert_eq!(s.list().len(), 1);
    }

    #[test]
    fn update_changes_only_named_fields() {
        let (kv, mut s) = store(WritePolicy::BestEffort);
        let created = s
            .add(NewAssignment {
                due_date: Some("2024-10-01".into()),
                description: Some("chapter 3".into()),
                link: Some("https://example.test".into()),
                points: Some(20),
                ..new("Math", "HW1")
            })
            .expect("add");

        assert!(s
            .update(&created.id, AssignmentPatch::completed(true))
            .expect("update"));

        let after = s.get(&created.id).expect("still there");
        assert!(after.completed);
        assert_eq!(
            Assignment {
                completed: false,
                ..after.clone()
            },
            created
        );
        assert_eq!(persisted(&kv), s.list());
    }

    #[test]
    fn update_and_delete_of_unknown_id_are_noops() {
        let (_kv, mut s) = store(WritePolicy::BestEffort);
        s.add(new("Math", "HW1")).expect("add");
        let before = s.list().to_vec();
        assert!(!s
            .update("nope", AssignmentPatch::completed(true))
            .expect("update"));
        assert!(!s.delete("nope").expect("delete"));
        assert_eq!(s.list(), before.as_slice());
    }

    #[test]
    fn deleted_ids_are_not_reissued() {
        let (_kv, mut s) = store(WritePolicy::BestEffort);
        let first = s.add(new("Math", "HW1")).expect("add");
        assert!(s.delete(&first.id).expect("delete"));
        let second = s.add(new("Math", "HW2")).expect("add");
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn initialize_reads_persisted_list() {
        let (kv, mut s) = store(WritePolicy::BestEffort);
        s.add(new("Math", "HW1")).expect("add");
        s.add(new("Art", "Sketch")).expect("add");
        let reloaded =
            AssignmentStore::initialize(kv, SequentialIds::default(), WritePolicy::BestEffort);
        assert_eq!(reloaded.list(), s.list());
    }

    #[test]
    fn malformed_persisted_list_starts_empty() {
        let kv = MemoryKv::with_entry(ASSIGNMENTS_KEY, "[{\"id\":");
        let s = AssignmentStore::initialize(kv, SequentialIds::default(), WritePolicy::Strict);
        assert!(s.list().is_empty());

        let kv = MemoryKv::with_entry(ASSIGNMENTS_KEY, "{\"not\":\"a list\"}");
        let s = AssignmentStore::initialize(kv, SequentialIds::default(), WritePolicy::Strict);
        assert!(s.list().is_empty());
    }

    #[test]
    fn best_effort_keeps_change_when_write_fails() {
        let (kv, mut s) = store(WritePolicy::BestEffort);
        kv.fail_writes(true);
        s.add(new("Math", "HW1")).expect("best effort add");
        assert_eq!(s.list().len(), 1);
        assert!(kv.raw(ASSIGNMENTS_KEY).is_none());
    }

    #[test]
    fn strict_rolls_back_when_write_fails() {
        let (kv, mut s) = store(WritePolicy::Strict);
        let kept = s.add(new("Math", "HW1")).expect("add");
        kv.fail_writes(true);

        assert!(s.add(new("Math", "HW2")).is_err());
        assert!(s.update(&kept.id, AssignmentPatch::completed(true)).is_err());
        assert!(s.delete(&kept.id).is_err());

        assert_eq!(s.list(), std::slice::from_ref(&kept));
        assert_eq!(persisted(&kv), s.list());
    }

    #[derive(Debug, Clone)]
    enum Op {
        Add(String, String, Option<u32>),
        Complete(usize, bool),
        Rename(usize, String),
        ClearPoints(usize),
        Delete(usize),
        DeleteMissing,
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            ("[A-Z][a-z]{0,6}", "[A-Za-z0-9 ]{1,12}", proptest::option::of(0u32..200))
                .prop_map(|(c, n, p)| Op::Add(c, n, p)),
            (any::<usize>(), any::<bool>()).prop_map(|(i, b)| Op::Complete(i, b)),
            (any::<usize>(), "[a-z]{1,8}").prop_map(|(i, n)| Op::Rename(i, n)),
            any::<usize>().prop_map(Op::ClearPoints),
            any::<usize>().prop_map(Op::Delete),
            Just(Op::DeleteMissing),
        ]
    }

    fn pick(s: &TestStore, i: usize) -> String {
        if s.list().is_empty() {
            "missing".to_string()
        } else {
            s.list()[i % s.list().len()].id.clone()
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]
        #[test]
        fn memory_matches_persisted_after_any_sequence(
            ops in proptest::collection::vec(op(), 1..40)
        ) {
            let (kv, mut s) = store(WritePolicy::BestEffort);
            for op in ops {
                match op {
                    Op::Add(c, n, p) => {
                        let before: Vec<String> =
                            s.list().iter().map(|a| a.id.clone()).collect();
                        let created = s
                            .add(NewAssignment { points: p, ..new(&c, &n) })
                            .expect("add");
                        prop_assert!(!before.contains(&created.id));
                    }
                    Op::Complete(i, b) => {
                        let id = pick(&s, i);
                        s.update(&id, AssignmentPatch::completed(b)).expect("update");
                    }
                    Op::Rename(i, n) => {
                        let id = pick(&s, i);
                        let patch = AssignmentPatch {
                            assignment_name: Some(n),
                            ..AssignmentPatch::default()
                        };
                        s.update(&id, patch).expect("update");
                    }
                    Op::ClearPoints(i) => {
                        let id = pick(&s, i);
                        let patch = AssignmentPatch {
                            points: Some(None),
                            ..AssignmentPatch::default()
                        };
                        s.update(&id, patch).expect("update");
                    }
                    Op::Delete(i) => {
                        let id = pick(&s, i);
                        s.delete(&id).expect("delete");
                    }
                    Op::DeleteMissing => {
                        let before = s.list().to_vec();
                        s.delete("missing").expect("delete");
                        prop_assert_eq!(s.list(), before.as_slice());
                    }
                }
                prop_assert_eq!(persisted(&kv), s.list().to_vec());
            }
        }
    }
}
