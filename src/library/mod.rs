//! Reusable job and resource templates

pub mod build_image;
pub mod git;
pub mod image;
pub mod self_update;
pub mod services;
pub mod tools;

pub use build_image::BuildImage;
pub use git::{GitSource, CONCOURSE_BUILDER_GIT};
pub use image::{couchbase, golang, riak_kv, ubuntu, Image, ImageRegistry, ImageSource};
pub use self_update::{SelfUpdate, SELF_UPDATE_JOB};
pub use services::ServiceImages;
pub use tools::{Concourse, ToolImages};

/// Group of every image build job
pub const IMAGES_GROUP: &str = "images";

/// Group of jobs maintaining the builder itself
pub const SYS_GROUP: &str = "sys";

/// Group of jobs building custom resource type images; image jobs come first
pub const RESOURCE_TYPE_GROUP: &str = "resource-type";
