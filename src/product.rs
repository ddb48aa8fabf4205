//! Listing record extracted from a search-result page

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single listing as it appears on a search-result page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Listing heading text (empty if the node had none)
    pub title: String,

    /// `src` of the listing image (empty if the node had none)
    #[serde(rename = "imageLink")]
    pub image_link: String,

    /// Dynamic "Key: Value" rows shown under the listing
    pub attributes: HashMap<String, String>,
}
