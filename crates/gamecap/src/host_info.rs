//! Host hardware inventory for session metadata.

use gamecap_core::session::{CpuSpecs, HostInfo, HostSpecs, SystemSpecs};

use std::fs;

use sysinfo::System;
use tracing::{debug, warn};

const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Files consulted, in order, for a stable machine identifier.
const HARDWARE_ID_SOURCES: &[&str] = &["/sys/class/dmi/id/product_uuid", "/etc/machine-id"];

/// Collect host details. Anything unavailable is left empty.
pub(crate) fn collect() -> HostInfo {
    let hardware_id = hardware_id();
    if hardware_id.is_none() {
        warn!("No hardware identifier available");
    }

    HostInfo {
        hardware_id,
        specs: specs(),
    }
}

fn hardware_id() -> Option<String> {
    HARDWARE_ID_SOURCES.iter().find_map(|path| {
        let id = fs::read_to_string(path).ok()?;
        let id = id.trim();
        (!id.is_empty()).then(|| id.to_string())
    })
}

fn specs() -> Option<HostSpecs> {
    let mut system = System::new();
    system.refresh_cpu_all();
    system.refresh_memory();

    let Some(cpu) = system.cpus().first() else {
        warn!("No CPU information available");
        return None;
    };

    let specs = HostSpecs {
        cpu: CpuSpecs {
            name: cpu.name().to_string(),
            brand: cpu.brand().to_string(),
            vendor: cpu.vendor_id().to_string(),
            cores: system.cpus().len(),
            frequency_mhz: cpu.frequency(),
        },
        system: SystemSpecs {
            os_name: System::name(),
            os_version: System::os_version(),
            kernel_version: System::kernel_version(),
            hostname: System::host_name(),
            total_memory_gb: system.total_memory() as f64 / BYTES_PER_GB,
        },
    };

    debug!(cpu = %specs.cpu.brand, cores = specs.cpu.cores, "Host inventory collected");

    Some(specs)
}
