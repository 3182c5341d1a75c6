use clap::Args;
use log::debug;
use miette::{IntoDiagnostic, Result};
use regex::Regex;
use termtree::Tree;

use crate::{error::CliError, options::GlobalOptions};

pub const DOCS_URL: &str = "https://docs.meilisearch.com";
pub const API_DOCS_URL: &str = "https://docs.meilisearch.com/reference/api/";

const ROOT_LABEL: &str = "MeiliSearch Documentation";

#[derive(Debug, Args)]
pub struct DocsLink {
    /// Root of the documentation, its sitemap is expected at `<DOCS_URL>/sitemap.xml`
    #[clap(long, default_value = DOCS_URL)]
    docs_url: String,
}

impl DocsLink {
    pub fn execute(self, options: &GlobalOptions) -> Result<()> {
        let base = self.docs_url.trim_end_matches('/');
        let sitemap = fetch_sitemap(base, options)?;
        let links = sitemap_links(&sitemap)?;
        debug!("{} links found in the sitemap", links.len());
        let tree = build_tree(&links, base)?;
        println!("{}", tree.render(atty::is(atty::Stream::Stdout)));
        Ok(())
    }
}

pub fn api_docs_link() -> Result<()> {
    let colored = atty::is(atty::Stream::Stdout);
    println!(
        "MeiliSearch API reference: {}",
        hyperlink(API_DOCS_URL, API_DOCS_URL, colored)
    );
    Ok(())
}

fn fetch_sitemap(base: &str, options: &GlobalOptions) -> Result<String> {
    let url = format!("{base}/sitemap.xml");
    debug!("GET {url}");
    let mut request = reqwest::blocking::Client::new()
        .get(url)
        .header(reqwest::header::USER_AGENT, &options.user_agent);
    if let Some((name, value)) = options.header()? {
        request = request.header(name, value);
    }
    request
        .send()
        .and_then(|response| response.error_for_status())
        .and_then(|response| response.text())
        .into_diagnostic()
}

/// Every `<loc>` of the sitemap, except the 404 page.
pub fn sitemap_links(sitemap: &str) -> Result<Vec<String>> {
    let loc = Regex::new(r"<loc>\s*([^<]*?)\s*</loc>").into_diagnostic()?;
    Ok(loc
        .captures_iter(sitemap)
        .map(|capture| capture[1].replace("&amp;", "&"))
        .filter(|link| !link.is_empty() && !link.ends_with("/404.html"))
        .collect())
}

/// The sections of `link` below `base`, without the empty trailing section.
/// `None` if the link lives outside of the documentation.
pub fn split_link<'a>(link: &'a str, base: &str) -> Option<Vec<&'a str>> {
    let rest = link.strip_prefix(base)?;
    if !(rest.is_empty() || rest.starts_with('/')) {
        return None;
    }
    Some(rest.split('/').filter(|s| !s.is_empty()).collect())
}

/// `getting_started.html` becomes `Getting Started`.
pub fn format_section(section: &str) -> String {
    let spaced = section.replace(['_', '-'], " ");
    let titled = title_case(&spaced);
    match titled.split_once('.') {
        Some((before, _)) => before.to_string(),
        None => titled,
    }
}

/// Uppercase the first letter of every word and lowercase the others.
fn title_case(s: &str) -> String {
    let mut previous_is_letter = false;
    s.chars()
        .flat_map(|c| {
            let mapped: Vec<char> = if !c.is_alphabetic() {
                vec![c]
            } else if previous_is_letter {
                c.to_lowercase().collect()
            } else {
                c.to_uppercase().collect()
            };
            previous_is_letter = c.is_alphabetic();
            mapped
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocNode {
    pub label: String,
    pub link: String,
    pub children: Vec<DocNode>,
}

impl DocNode {
    fn new(label: String, link: &str) -> Self {
        DocNode {
            label,
            link: link.to_string(),
            children: Vec::new(),
        }
    }

    fn child(&mut self, label: String, link: &str) -> &mut DocNode {
        let position = match self.children.iter().position(|child| child.label == label) {
            Some(position) => position,
            None => {
                self.children.push(DocNode::new(label, link));
                self.children.len() - 1
            }
        };
        &mut self.children[position]
    }

    pub fn to_tree(&self, hyperlinks: bool) -> Tree<String> {
        Tree::new(hyperlink(&self.label, &self.link, hyperlinks)).with_leaves(
            self.children
                .iter()
                .map(|child| child.to_tree(hyperlinks)),
        )
    }

    pub fn render(&self, hyperlinks: bool) -> String {
        self.to_tree(hyperlinks).to_string()
    }
}

/// Builds the documentation tree. Every node links to the first page that
/// introduced it and siblings keep the order of the sitemap.
pub fn build_tree(links: &[String], base: &str) -> Result<DocNode> {
    let mut root: Option<DocNode> = None;
    for link in links {
        let sections = match split_link(link, base) {
            Some(sections) => sections,
            None => {
                debug!("ignoring `{link}`, it is not part of {base}");
                continue;
            }
        };
        let mut node = root.get_or_insert_with(|| DocNode::new(ROOT_LABEL.to_string(), link));
        for section in sections {
            node = node.child(format_section(section), link);
        }
    }
    root.ok_or_else(|| CliError::EmptyDocumentation.into())
}

/// On a terminal the label becomes a clickable link, otherwise the url is
/// written next to it.
fn hyperlink(label: &str, link: &str, terminal: bool) -> String {
    if terminal {
        format!("\x1b]8;;{link}\x1b\\{label}\x1b]8;;\x1b\\")
    } else if label == link {
        link.to_string()
    } else {
        format!("{label} ({link})")
    }
}
