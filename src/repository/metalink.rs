// src/repository/metalink.rs

//! Metalink rendering
//!
//! Generation is split in two steps: [`MetalinkDocument::assemble`] gathers
//! everything a metalink states about the descriptor (size, build timestamp,
//! hashes, alternates, mirror URLs, generator and publish time), and
//! [`MetalinkFormat::render`] turns that data into text. Rendering is a pure
//! function of the document.

use crate::error::{Error, Result};
use crate::hash::HashAlgorithm;
use chrono::{DateTime, Utc};
use quick_xml::escape::escape;
use std::fmt::{self, Write};

use super::alternates::Alternate;
use super::repomd::RepoMd;
use super::xml::{NS_METALINK3, NS_METALINK4, NS_MM0};

/// Generator identifier written into every metalink
pub const GENERATOR: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MetalinkFormat {
    /// Metalink 3.0 with MirrorManager extensions, as read by yum and dnf
    #[default]
    Metalink3,
    /// RFC 5854 Metalink 4; has no alternates
    Metalink4,
}

/// Everything a metalink says about one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetalinkDocument {
    pub file_name: String,
    pub timestamp: u64,
    pub size: u64,
    pub hashes: Vec<(HashAlgorithm, String)>,
    pub alternates: Vec<Alternate>,
    pub urls: Vec<String>,
    pub generator: String,
    pub published: DateTime<Utc>,
}

impl MetalinkDocument {
    /// Gather the data for a metalink of `repomd`
    ///
    /// Fails if `urls` is empty: a file mirrored nowhere is a configuration
    /// error, not an empty metalink.
    pub fn assemble(
        repomd: &RepoMd,
        hash_types: &[HashAlgorithm],
        urls: Vec<String>,
        published: DateTime<Utc>,
    ) -> Result<Self> {
        if urls.is_empty() {
            return Err(Error::NotMirrored {
                path: repomd.path().to_path_buf(),
            });
        }

        Ok(Self {
            file_name: repomd.file_name(),
            timestamp: repomd.timestamp(),
            size: repomd.size(),
            hashes: hash_types
                .iter()
                .map(|algo| (*algo, repomd.get_hash(*algo).to_string()))
                .collect(),
            alternates: repomd.alternates(),
            urls,
            generator: GENERATOR.to_string(),
            published,
        })
    }
}

impl MetalinkFormat {
    /// Render a document in this format
    pub fn render(self, doc: &MetalinkDocument) -> String {
        Rendered { format: self, doc }.to_string()
    }
}

struct Rendered<'a> {
    format: MetalinkFormat,
    doc: &'a MetalinkDocument,
}

impl fmt::Display for Rendered<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.format {
            MetalinkFormat::Metalink3 => write_metalink3(self.doc, f),
            MetalinkFormat::Metalink4 => write_metalink4(self.doc, f),
        }
    }
}

fn write_metalink3(doc: &MetalinkDocument, out: &mut impl Write) -> fmt::Result {
    writeln!(out, r#"<?xml version="1.0" encoding="utf-8"?>"#)?;
    writeln!(out, r#"<metalink version="3.0""#)?;
    writeln!(out, r#"        generator="{}""#, escape(&doc.generator))?;
    writeln!(
        out,
        r#"        pubdate="{}""#,
        doc.published.format("%a, %d %b %Y %H:%M:%S GMT")
    )?;
    writeln!(out, r#"        xmlns="{NS_METALINK3}""#)?;
    writeln!(out, r#"        xmlns:mm0="{NS_MM0}">"#)?;
    writeln!(out)?;
    writeln!(out, "    <files>")?;
    writeln!(out, r#"        <file name="{}">"#, escape(&doc.file_name))?;
    writeln!(out, "            <mm0:timestamp>{}</mm0:timestamp>", doc.timestamp)?;
    writeln!(out, "            <size>{}</size>", doc.size)?;

    if !doc.alternates.is_empty() {
        writeln!(out, "            <mm0:alternates>")?;
        for alternate in &doc.alternates {
            writeln!(out, "                <mm0:alternate>")?;
            writeln!(
                out,
                "                    <mm0:timestamp>{}</mm0:timestamp>",
                alternate.timestamp
            )?;
            writeln!(out, "                    <size>{}</size>", alternate.size)?;
            writeln!(out, "                    <verification>")?;
            for (hash_type, hash) in &alternate.hashes {
                writeln!(
                    out,
                    r#"                        <hash type="{}">{}</hash>"#,
                    escape(hash_type),
                    escape(hash)
                )?;
            }
            writeln!(out, "                    </verification>")?;
            writeln!(out, "                </mm0:alternate>")?;
        }
        writeln!(out, "            </mm0:alternates>")?;
    }

    writeln!(out, "            <verification>")?;
    for (algo, hash) in &doc.hashes {
        writeln!(out, r#"                <hash type="{algo}">{hash}</hash>"#)?;
    }
    writeln!(out, "            </verification>")?;
    writeln!(out)?;
    writeln!(out, r#"            <resources maxconnections="1">"#)?;
    for url in &doc.urls {
        writeln!(out, "                <url>{}</url>", escape(url))?;
    }
    writeln!(out, "            </resources>")?;
    writeln!(out, "        </file>")?;
    writeln!(out, "    </files>")?;
    writeln!(out, "</metalink>")?;
    Ok(())
}

fn write_metalink4(doc: &MetalinkDocument, out: &mut impl Write) -> fmt::Result {
    writeln!(out, r#"<?xml version="1.0" encoding="utf-8"?>"#)?;
    writeln!(out, "<metalink")?;
    writeln!(out, r#"        xmlns="{NS_METALINK4}""#)?;
    writeln!(out, r#"        xmlns:mm0="{NS_MM0}">"#)?;
    writeln!(out, "    <generator>{}</generator>", escape(&doc.generator))?;
    writeln!(
        out,
        "    <published>{}</published>",
        doc.published.format("%Y-%m-%dT%H:%M:%SZ")
    )?;
    writeln!(out)?;
    writeln!(out, "    <files>")?;
    writeln!(out, r#"        <file name="{}">"#, escape(&doc.file_name))?;
    writeln!(out, "            <mm0:timestamp>{}</mm0:timestamp>", doc.timestamp)?;
    writeln!(out, "            <size>{}</size>", doc.size)?;
    for (algo, hash) in &doc.hashes {
        writeln!(out, r#"            <hash type="{algo}">{hash}</hash>"#)?;
    }
    for url in &doc.urls {
        writeln!(out, "            <url>{}</url>", escape(url))?;
    }
    writeln!(out, "        </file>")?;
    writeln!(out, "    </files>")?;
    writeln!(out, "</metalink>")?;
    Ok(())
}
