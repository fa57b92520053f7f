//! Value objects returned by the portal backend.
//!
//! The orchestrator never mutates these locally: they are deserialized from
//! responses, carried inside actions and replaced wholesale by the reducer.
//! Fields the portal does not interpret are kept in a flattened `extra` map so
//! they survive the round trip.

pub mod allocation;
pub mod file;
pub mod job;
pub mod system;

pub use allocation::{Allocation, AllocationGrant, AllocationSystem, Allocations, AllocationsPage, SystemColumn};
pub use file::{
    is_valid_file_name, FileEntry, FileListing, FileListingParams, FileOperation, FilesSection, OperationStatus,
    ToolbarPermissions,
};
pub use job::{Job, JobEntry, ListError};
pub use system::{PushKeysForm, StorageDefinition, SystemDefinition, SystemListEntry, SystemsOperation};
