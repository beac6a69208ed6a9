use std::fs::Metadata;

use crate::model::SizeMetric;

pub fn metric_size(metadata: &Metadata, metric: SizeMetric) -> u64 {
    match metric {
        SizeMetric::Apparent => metadata.len(),
        SizeMetric::Allocated => allocated_size(metadata),
    }
}

pub fn allocated_size(metadata: &Metadata) -> u64 {
    #[cfg(unix)]
    {
        use std::os::unix::fs::MetadataExt;
        let blocks = metadata.blocks();
        if blocks > 0 {
            return blocks.saturating_mul(512);
        }
    }

    #[cfg(windows)]
    {
        use std::os::windows::fs::MetadataExt;
        let len = metadata.file_size();
        const CLUSTER: u64 = 4096;
        return len.div_ceil(CLUSTER) * CLUSTER;
    }

    metadata.len()
}
