use crossbeam_channel::Receiver;

use crate::model::SizeEvent;

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub struct FileTotals {
    pub files: u64,
    pub bytes: u64,
}

impl FileTotals {
    pub fn record(&mut self, event: SizeEvent) {
        self.files = self.files.saturating_add(1);
        self.bytes = self.bytes.saturating_add(event.0);
    }
}

/// Consumes size events until every sender is gone.
pub fn drain(receiver: &Receiver<SizeEvent>) -> FileTotals {
    let mut totals = FileTotals::default();
    for event in receiver.iter() {
        totals.record(event);
    }
    totals
}

#[cfg(test)]
mod tests {
    use std::thread;

    use crossbeam_channel::bounded;

    use super::*;

    #[test]
    fn sums_events_from_many_producers() {
        let (tx, rx) = bounded(4);
        let producers: Vec<_> = (0..4_u64)
            .map(|producer| {
                let tx = tx.clone();
                thread::spawn(move || {
                    for size in 0..100_u64 {
                        tx.send(SizeEvent(producer * 1000 + size)).expect("send");
                    }
                })
            })
            .collect();
        drop(tx);

        let totals = drain(&rx);
        for producer in producers {
            producer.join().expect("producer");
        }

        let expected_bytes: u64 = (0..4_u64)
            .flat_map(|producer| (0..100_u64).map(move |size| producer * 1000 + size))
            .sum();
        assert_eq!(totals.files, 400);
        assert_eq!(totals.bytes, expected_bytes);
    }

    #[test]
    fn closed_empty_channel_yields_zero() {
        let (tx, rx) = bounded::<SizeEvent>(1);
        drop(tx);
        assert_eq!(drain(&rx), FileTotals::default());
    }
}
