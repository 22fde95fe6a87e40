//! Transfer service - moves units between two ledger accounts

use std::sync::Arc;

use crate::domain::result::Result;
use crate::domain::TransferRequest;
use crate::ports::LedgerStore;

use super::account::{read_balance, write_balance};

/// Balance transfer engine
pub struct TransferService {
    store: Arc<dyn LedgerStore>,
}

impl TransferService {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    /// `transfer(A, B, X)`: pay X units from A to B
    pub fn transfer(&self, args: &[String]) -> Result<()> {
        let request = TransferRequest::from_args(args)?;
        self.execute(&request)
    }

    /// Apply an already validated request
    ///
    /// Both accounts must exist. Balances may go negative. The two writes
    /// are not atomic with respect to each other. When source and
    /// destination are the same key both balances are read up front, so the
    /// credit write lands last and the account gains `amount`.
    pub fn execute(&self, request: &TransferRequest) -> Result<()> {
        let store = self.store.as_ref();

        let from = read_balance(store, &request.from)?;
        let to = read_balance(store, &request.to)?;

        let (new_from, new_to) = request.apply(from, to)?;
        tracing::debug!(
            from = %request.from,
            to = %request.to,
            amount = request.amount,
            new_from = new_from.value(),
            new_to = new_to.value(),
            "applying transfer"
        );

        write_balance(store, &request.from, new_from)?;
        write_balance(store, &request.to, new_to)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::Ordering;

    use crate::adapters::MemoryLedgerStore;
    use crate::domain::result::Error;
    use crate::services::testing::{args, FailingStore};

    fn funded() -> (Arc<MemoryLedgerStore>, TransferService) {
        let store = Arc::new(MemoryLedgerStore::with_entries([("A", "100"), ("B", "200")]));
        let service = TransferService::new(store.clone());
        (store, service)
    }

    #[test]
    fn test_transfer_moves_amount() {
        let (store, service) = funded();
        service.transfer(&args(&["A", "B", "50"])).unwrap();

        assert_eq!(store.get("A").unwrap(), Some(b"50".to_vec()));
        assert_eq!(store.get("B").unwrap(), Some(b"250".to_vec()));
    }

    #[test]
    fn test_transfer_may_go_negative() {
        let (store, service) = funded();
        service.transfer(&args(&["A", "B", "130"])).unwrap();
        assert_eq!(store.get("A").unwrap(), Some(b"-30".to_vec()));

        // Negative amounts move value the other way
        service.transfer(&args(&["A", "B", "-30"])).unwrap();
        assert_eq!(store.get("A").unwrap(), Some(b"0".to_vec()));
        assert_eq!(store.get("B").unwrap(), Some(b"300".to_vec()));
    }

    #[test]
    fn test_transfer_unknown_source_writes_nothing() {
        let store = Arc::new(FailingStore::new());
        store.inner.put("B", b"200").unwrap();
        let service = TransferService::new(store.clone());

        let err = service.transfer(&args(&["X", "B", "10"])).unwrap_err();
        assert!(matches!(err, Error::AccountNotFound(ref key) if key == "X"));
        assert_eq!(store.puts.load(Ordering::SeqCst), 0);
        assert_eq!(store.inner.get("B").unwrap(), Some(b"200".to_vec()));
    }

    #[test]
    fn test_transfer_unknown_destination() {
        let (store, service) = funded();
        let err = service.transfer(&args(&["A", "Y", "10"])).unwrap_err();
        assert!(matches!(err, Error::AccountNotFound(ref key) if key == "Y"));
        assert_eq!(store.get("A").unwrap(), Some(b"100".to_vec()));
    }

    #[test]
    fn test_transfer_invalid_amount() {
        let (store, service) = funded();
        let err = service.transfer(&args(&["A", "B", "ten"])).unwrap_err();
        assert!(matches!(err, Error::InvalidAmount(_)));
        assert_eq!(store.get("A").unwrap(), Some(b"100".to_vec()));
    }

    #[test]
    fn test_transfer_to_same_account_keeps_credit() {
        let (store, service) = funded();
        service.transfer(&args(&["A", "A", "50"])).unwrap();

        assert_eq!(store.get("A").unwrap(), Some(b"150".to_vec()));
        assert_eq!(store.get("B").unwrap(), Some(b"200".to_vec()));
    }

    #[test]
    fn test_transfer_argument_count() {
        let (_, service) = funded();
        let err = service.transfer(&args(&["A", "B"])).unwrap_err();
        assert!(matches!(err, Error::ArgumentCount { expected: 3, got: 2 }));
    }

    #[test]
    fn test_transfer_lookup_failure() {
        let store = Arc::new(FailingStore::new().fail_get_on("B"));
        store.inner.put("A", b"1").unwrap();
        let service = TransferService::new(store);

        let err = service.transfer(&args(&["A", "B", "1"])).unwrap_err();
        assert!(matches!(err, Error::LookupFailed { ref key, .. } if key == "B"));
    }

    #[test]
    fn test_transfer_corrupt_balance() {
        let store = Arc::new(MemoryLedgerStore::with_entries([("A", "abc"), ("B", "1")]));
        let service = TransferService::new(store);

        let err = service.transfer(&args(&["A", "B", "1"])).unwrap_err();
        assert!(matches!(err, Error::CorruptBalance { .. }));
    }

    #[test]
    fn test_transfer_second_write_failure_keeps_first() {
        let store = Arc::new(FailingStore::new().fail_put_on("B"));
        store.inner.put("A", b"100").unwrap();
        store.inner.put("B", b"200").unwrap();
        let service = TransferService::new(store.clone());

        let err = service.transfer(&args(&["A", "B", "50"])).unwrap_err();
        assert!(matches!(err, Error::WriteFailed { .. }));
        assert_eq!(store.inner.get("A").unwrap(), Some(b"50".to_vec()));
        assert_eq!(store.inner.get("B").unwrap(), Some(b"200".to_vec()));
    }
}
