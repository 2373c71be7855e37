//! Search, ordering and paging over the history record set

use fraudlens_client::TransactionRecord;
use fraudlens_utils::parse_instant;
use std::cmp::Ordering;

use crate::models::{SortDirection, SortKey};

/// Does a record match a lowercased search term?
///
/// Sender and receiver match case-insensitively; the amount matches on its
/// decimal string form. An empty term matches everything.
pub fn matches_search(record: &TransactionRecord, term_lower: &str) -> bool {
    term_lower.is_empty()
        || record.sender.to_lowercase().contains(term_lower)
        || record.receiver.to_lowercase().contains(term_lower)
        || record.amount_text().contains(term_lower)
}

/// Records matching `term`, in fetch order
pub fn filter_records<'a>(records: &'a [TransactionRecord], term: &str) -> Vec<&'a TransactionRecord> {
    let term_lower = term.to_lowercase();
    records
        .iter()
        .filter(|r| matches_search(r, &term_lower))
        .collect()
}

/// Natural ascending order of two records on one column
///
/// Timestamps compare chronologically; unparseable ones sort before every
/// parseable one and among themselves by their text.
pub fn compare_by(a: &TransactionRecord, b: &TransactionRecord, key: SortKey) -> Ordering {
    match key {
        SortKey::Amount => a.amount.total_cmp(&b.amount),
        SortKey::Sender => a.sender.cmp(&b.sender),
        SortKey::Receiver => a.receiver.cmp(&b.receiver),
        SortKey::Timestamp => parse_instant(&a.timestamp)
            .cmp(&parse_instant(&b.timestamp))
            .then_with(|| a.timestamp.cmp(&b.timestamp)),
        SortKey::IsFraud => a.is_fraud.cmp(&b.is_fraud),
    }
}

/// Stable sort: records with equal keys keep their relative order in both
/// directions.
pub fn sort_records(records: &mut [&TransactionRecord], key: SortKey, direction: SortDirection) {
    match direction {
        SortDirection::Ascending => records.sort_by(|a, b| compare_by(a, b, key)),
        SortDirection::Descending => records.sort_by(|a, b| compare_by(b, a, key)),
    }
}

/// `ceil(len / page_size)`
pub fn total_pages(len: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    (len + page_size - 1) / page_size
}

/// Items on a 1-based page. Out-of-range pages are empty.
pub fn page_window<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    if page == 0 || page_size == 0 {
        return &[];
    }
    let start = (page - 1).saturating_mul(page_size);
    if start >= items.len() {
        return &[];
    }
    let end = (start + page_size).min(items.len());
    &items[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(amount: f64, sender: &str, receiver: &str, timestamp: &str, is_fraud: bool) -> TransactionRecord {
        TransactionRecord {
            amount,
            sender: sender.to_string(),
            receiver: receiver.to_string(),
            timestamp: timestamp.to_string(),
            is_fraud,
            description: None,
            category: None,
        }
    }

    fn sample() -> Vec<TransactionRecord> {
        vec![
            record(500.0, "alice@okbank", "shop@upi", "2024-06-01T10:00:00Z", false),
            record(12.5, "Bob@HDFC", "alice@okbank", "2024-05-01T09:00:00Z", true),
            record(9999.0, "carol@sbi", "dave@icici", "2024-07-15T18:30:00+05:30", true),
            record(500.0, "erin@axis", "frank@upi", "2024-06-01T10:00:00Z", false),
        ]
    }

    #[test]
    fn test_empty_term_matches_all() {
        let records = sample();
        assert_eq!(filter_records(&records, "").len(), records.len());
    }

    #[test]
    fn test_filter_is_case_insensitive_on_parties() {
        let records = sample();
        let hits = filter_records(&records, "ALICE");
        assert_eq!(hits.len(), 2);
        let hits = filter_records(&records, "hdfc");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].sender, "Bob@HDFC");
    }

    #[test]
    fn test_filter_on_amount_text() {
        let records = sample();
        let hits = filter_records(&records, "12.5");
        assert_eq!(hits.len(), 1);
        let hits = filter_records(&records, "99");
        assert_eq!(hits.len(), 1);
        assert!(filter_records(&records, "nothing-matches").is_empty());
    }

    #[test]
    fn test_filter_results_contain_term() {
        let records = sample();
        for term in ["a", "@", "5", "UPI", "x"] {
            let lower = term.to_lowercase();
            for hit in filter_records(&records, term) {
                assert!(
                    hit.sender.to_lowercase().contains(&lower)
                        || hit.receiver.to_lowercase().contains(&lower)
                        || hit.amount_text().contains(&lower)
                );
                assert!(records.iter().any(|r| *r == *hit));
            }
        }
    }

    #[test]
    fn test_sort_amount_numeric() {
        let records = sample();
        let mut view: Vec<&TransactionRecord> = records.iter().collect();
        sort_records(&mut view, SortKey::Amount, SortDirection::Ascending);
        let amounts: Vec<f64> = view.iter().map(|r| r.amount).collect();
        assert_eq!(amounts, vec![12.5, 500.0, 500.0, 9999.0]);
        // ties keep insertion order
        assert_eq!(view[1].sender, "alice@okbank");
        assert_eq!(view[2].sender, "erin@axis");
    }

    #[test]
    fn test_sort_descending_reverses_distinct_keys() {
        let records = sample();
        let mut asc: Vec<&TransactionRecord> = records.iter().collect();
        let mut desc = asc.clone();
        sort_records(&mut asc, SortKey::Amount, SortDirection::Ascending);
        sort_records(&mut desc, SortKey::Amount, SortDirection::Descending);
        assert_eq!(desc[0].amount, 9999.0);
        assert_eq!(desc[3].amount, 12.5);
        // equal keys stay in insertion order even when descending
        assert_eq!(desc[1].sender, "alice@okbank");
        assert_eq!(desc[2].sender, "erin@axis");
        assert_eq!(asc[0], desc[3]);
    }

    #[test]
    fn test_sort_timestamp_chronological() {
        let records = sample();
        let mut view: Vec<&TransactionRecord> = records.iter().collect();
        sort_records(&mut view, SortKey::Timestamp, SortDirection::Ascending);
        assert_eq!(view[0].sender, "Bob@HDFC");
        assert_eq!(view[3].sender, "carol@sbi");
    }

    #[test]
    fn test_unparseable_timestamps_sort_first() {
        let records = vec![
            record(1.0, "a@x", "b@y", "2024-01-01T00:00:00Z", false),
            record(2.0, "c@x", "d@y", "garbage", false),
        ];
        let mut view: Vec<&TransactionRecord> = records.iter().collect();
        sort_records(&mut view, SortKey::Timestamp, SortDirection::Ascending);
        assert_eq!(view[0].timestamp, "garbage");
    }

    #[test]
    fn test_sort_lexicographic_and_boolean() {
        let records = sample();
        let mut view: Vec<&TransactionRecord> = records.iter().collect();
        sort_records(&mut view, SortKey::Sender, SortDirection::Ascending);
        let senders: Vec<&str> = view.iter().map(|r| r.sender.as_str()).collect();
        assert_eq!(senders, vec!["Bob@HDFC", "alice@okbank", "carol@sbi", "erin@axis"]);

        sort_records(&mut view, SortKey::IsFraud, SortDirection::Ascending);
        assert!(!view[0].is_fraud && !view[1].is_fraud);
        assert!(view[2].is_fraud && view[3].is_fraud);

        sort_records(&mut view, SortKey::Receiver, SortDirection::Descending);
        assert_eq!(view[0].receiver, "shop@upi");
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(1, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(25, 10), 3);
        assert_eq!(total_pages(5, 0), 0);
    }

    #[test]
    fn test_page_window() {
        let items: Vec<usize> = (0..25).collect();
        assert_eq!(page_window(&items, 1, 10), &items[0..10]);
        assert_eq!(page_window(&items, 3, 10), &items[20..25]);
        assert!(page_window(&items, 4, 10).is_empty());
        assert!(page_window(&items, 0, 10).is_empty());
    }
}
