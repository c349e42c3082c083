//! Initialize a new blog

use anyhow::Result;
use serde_json::json;
use std::fs;
use std::path::Path;

use crate::CONFIG_FILE;

/// Sample fixture written next to the configuration
pub const SAMPLE_FIXTURE: &str = "fixtures/posts.json";

/// Initialize a new site in the given directory
pub fn init_site(target_dir: &Path) -> Result<()> {
    let config_path = target_dir.join(CONFIG_FILE);
    if config_path.exists() {
        anyhow::bail!("{:?} already exists", config_path);
    }

    fs::create_dir_all(target_dir)?;

    let config_content = r#"# spacetraveling configuration

# Site
title: spacetraveling
description: ''
url: http://localhost:3000
language: pt-BR
timezone: America/Sao_Paulo

# Dates (date-fns patterns)
date_format: dd MMM yyyy
datetime_format: "dd MMM yyyy', às 'kk':'mm"

# Listing
per_page: 1
max_pages: 50
words_per_minute: 200

# Directory
public_dir: public

# Content repository
# The access token can also be set with PRISMIC_ACCESS_TOKEN
prismic:
  endpoint: https://spacetraveling.cdn.prismic.io/api/v2
  document_type: posts
  timeout_secs: 30
"#;

    fs::write(&config_path, config_content)?;

    // Sample post for offline builds with --fixtures
    let now = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S%z").to_string();
    let sample = json!([{
        "id": "sample-post",
        "uid": "hello-world",
        "type": "posts",
        "first_publication_date": now,
        "last_publication_date": now,
        "data": {
            "title": "Hello World",
            "subtitle": "Your very first post",
            "author": "spacetraveling",
            "banner": { "url": null, "alt": null },
            "content": [{
                "heading": "Quick start",
                "body": [
                    {
                        "type": "paragraph",
                        "text": "Edit _config.yml to point at your repository, then run generate.",
                        "spans": [{ "start": 5, "end": 16, "type": "strong" }]
                    },
                    { "type": "list-item", "text": "generate writes the site to public/", "spans": [] },
                    { "type": "list-item", "text": "server renders pages on demand", "spans": [] }
                ]
            }]
        }
    }]);

    let fixture_path = target_dir.join(SAMPLE_FIXTURE);
    if let Some(parent) = fixture_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&fixture_path, serde_json::to_string_pretty(&sample)?)?;

    Ok(())
}
