//! Derived utilization metrics
//!
//! Maps raw samples to records carrying utilization, efficiency, and waste
//! percentages. Pure and stateless; a zero total yields 0, not NaN.

use crate::models::{HypervisorSample, UtilizationRecord};

/// used/total as a percentage; 0 when the total is 0
pub fn ratio_pct(used: f64, total: f64) -> f64 {
    if total == 0.0 {
        0.0
    } else {
        used / total * 100.0
    }
}

/// Compute the derived record for one sample
pub fn derive(sample: HypervisorSample) -> UtilizationRecord {
    let cpu_utilization = ratio_pct(sample.vcpus_used, sample.vcpus_total);
    let memory_utilization = ratio_pct(sample.memory_used_mb, sample.memory_total_mb);
    let disk_utilization = ratio_pct(sample.disk_used_gb, sample.disk_total_gb);
    let cpu_efficiency = ratio_pct(sample.total_instance_vcpus, sample.vcpus_total);
    let memory_efficiency = ratio_pct(sample.total_instance_memory_mb, sample.memory_total_mb);

    UtilizationRecord {
        cpu_utilization,
        memory_utilization,
        disk_utilization,
        cpu_efficiency,
        memory_efficiency,
        cpu_waste: cpu_utilization - cpu_efficiency,
        memory_waste: memory_utilization - memory_efficiency,
        sample,
    }
}

/// Compute derived records for the whole window, preserving order
pub fn derive_all(samples: Vec<HypervisorSample>) -> Vec<UtilizationRecord> {
    samples.into_iter().map(derive).collect()
}
