//! Whole-pipeline templates assembled from library jobs

pub mod branch;

pub use branch::{
    generate_branch, generate_branch_bootstrap, Branch, BranchBootstrap, BranchProject,
};
