//! Domain types and pure logic

pub mod activity;
pub mod class;
pub mod class_name;
pub mod documentation;
pub mod skills;

pub use activity::{Activity, ActivityPatch, NewActivity, Resource, ResourceLink};
pub use class::{ClassAggregate, SkillSummary};
pub use class_name::{ClassName, GRADE_LEVELS};
pub use documentation::{Documentation, DocumentationPatch, NewDocumentation};
pub use skills::{CategoryProgress, SkillCatalog, SkillCategory, SkillPolicy};
