//! Service layer for the Medica service.
//!
//! Business logic sits here between handlers and repositories. Pure pieces
//! (distance, ranking, sampling, validation helpers) are free functions
//! with no store access.
//!
//! # Components
//!
//! - `geo` - Haversine distance and rounding
//! - `medicine_locator` - Nearest-pharmacy medicine search
//! - `vip_assignment` - VIP consult fan-out to qualified doctors
//! - `reviews` - Review submission and rating aggregation
//! - `availability` - Doctor weekly slots
//! - `pharmacy_stock` - Pharmacy stock updates
//! - `doctor_directory` - Public doctor listings
//! - `attachments` - Consult attachment storage

pub mod attachments;
pub mod availability;
pub mod doctor_directory;
pub mod geo;
pub mod medicine_locator;
pub mod pharmacy_stock;
pub mod reviews;
pub mod vip_assignment;

pub use attachments::{AttachmentStore, LocalAttachmentStore};
pub use availability::AvailabilityService;
pub use doctor_directory::DoctorDirectoryService;
pub use medicine_locator::{MedicineLocatorService, RequesterLocation};
pub use pharmacy_stock::PharmacyStockService;
pub use reviews::ReviewService;
pub use vip_assignment::VipAssignmentService;
