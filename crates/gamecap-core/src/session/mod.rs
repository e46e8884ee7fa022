mod atomic;
mod layout;
mod log_writer;
mod metadata;

pub use {
    layout::{
        INVALID_MARKER, LOG_FILE, METADATA_FILE, SessionDir, UPLOADED_MARKER, target_stem,
    },
    log_writer::{
        END_MARKER, FinalizeReport, LOG_HEADER, LogRow, START_MARKER, SessionLog,
        SessionLogWriter,
    },
    metadata::{CpuSpecs, HostInfo, HostSpecs, Metadata, MetadataRecord, SystemSpecs},
};
