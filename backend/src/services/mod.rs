//! Business logic services for the point-of-sale backend

pub mod auth;
pub mod inventory;
pub mod invoice_document;
pub mod product;
pub mod purchase;
pub mod sales;
pub mod supplier;

#[cfg(test)]
pub(crate) mod fixtures;

pub use auth::AuthService;
pub use invoice_document::InvoiceDocumentService;
pub use product::ProductService;
pub use purchase::PurchaseService;
pub use sales::SalesService;
pub use supplier::SupplierService;
