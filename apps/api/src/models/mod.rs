pub mod crm;
pub mod record;
