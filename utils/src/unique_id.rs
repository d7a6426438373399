/// Hands out increasing ids, starting at zero.
///
/// Every code generator owns its own instance, so two compilations in the same
/// process produce the same label names.
#[derive(Debug, Default)]
pub struct UniqueId {
    next: u64,
}

impl UniqueId {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// Returns a `(true, end)` label pair for a compare-and-branch sequence.
    pub fn next_label_pair(&mut self, action: &str) -> (String, String) {
        let id = self.next_id();
        (format!("{action}true{id}"), format!("{action}end{id}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_monotonic() {
        let mut ids = UniqueId::new();

        assert_eq!(ids.next_id(), 0);
        assert_eq!(ids.next_id(), 1);
        assert_eq!(ids.next_id(), 2);
    }

    #[test]
    fn test_label_pairs_never_repeat() {
        let mut ids = UniqueId::new();

        let first = ids.next_label_pair("cmp");
        let second = ids.next_label_pair("cmp");

        assert_eq!(first, ("cmptrue0".to_owned(), "cmpend0".to_owned()));
        assert_eq!(second, ("cmptrue1".to_owned(), "cmpend1".to_owned()));
    }

    #[test]
    fn test_instances_do_not_share_state() {
        let mut a = UniqueId::new();
        let mut b = UniqueId::new();

        a.next_id();
        a.next_id();

        assert_eq!(b.next_id(), 0);
    }
}
