pub mod emit_members;
pub mod emit_plans;
pub mod emit_ron;
pub mod load;
pub mod select;
pub mod synthesize;
