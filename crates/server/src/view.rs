//! HTML rendering of the search page.

use std::fmt::Write;

use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};
use pricescout_core::{SearchOutcome, Website};

use crate::params::SearchParams;

const STYLE: &str = "body{font-family:sans-serif;max-width:960px;margin:2rem auto;padding:0 1rem}\
form{display:flex;flex-wrap:wrap;gap:.5rem;align-items:center}\
ol li{margin:.4rem 0}.price{font-weight:bold}.site{color:#666}";

/// Search page for `params`; `outcome` is `None` for the empty state.
pub fn page(params: &SearchParams, websites: &[Website], outcome: Option<&SearchOutcome>) -> String {
    let mut html = String::with_capacity(4096);
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\"><title>");
    if params.q.is_empty() {
        html.push_str("pricescout");
    } else {
        let _ = write!(html, "{} - pricescout", text(&params.q));
    }
    let _ = write!(html, "</title><style>{STYLE}</style></head>\n<body>\n<h1>pricescout</h1>\n");

    search_form(&mut html, params, websites);

    match outcome {
        Some(outcome) => results(&mut html, params, outcome),
        None => html.push_str("<p class=\"empty\">Enter keywords to compare prices across sites.</p>\n"),
    }

    html.push_str("</body>\n</html>\n");
    html
}

fn search_form(html: &mut String, params: &SearchParams, websites: &[Website]) {
    let selection = params.selection();

    html.push_str("<form method=\"get\" action=\"/\">\n");
    let _ = writeln!(
        html,
        "<input type=\"text\" name=\"q\" placeholder=\"Search for\" value=\"{}\">",
        attr(&params.q)
    );
    let _ = writeln!(
        html,
        "<input type=\"text\" name=\"ban\" placeholder=\"Exclude keywords\" value=\"{}\">",
        attr(&params.ban)
    );
    html.push_str("<label><input type=\"checkbox\" name=\"refresh\" value=\"1\"> refresh</label>\n");
    html.push_str("<input type=\"hidden\" name=\"site_sel\" value=\"1\">\n");

    for website in websites {
        let checked = if selection.allows(&website.name) { " checked" } else { "" };
        let _ = writeln!(
            html,
            "<label><input type=\"checkbox\" name=\"site\" value=\"{}\"{checked}> {}</label>",
            attr(&website.name),
            text(&website.name)
        );
    }

    html.push_str("<button type=\"submit\">Search</button>\n</form>\n");
}

fn results(html: &mut String, params: &SearchParams, outcome: &SearchOutcome) {
    let _ = writeln!(html, "<p>Number of items found: {}</p>", outcome.found);
    if !params.ban.is_empty() {
        let _ = writeln!(
            html,
            "<p>After filtering ({}), remaining: {}</p>",
            text(&params.ban),
            outcome.remaining
        );
    }

    if outcome.products.is_empty() {
        html.push_str("<p class=\"empty\">No items left.</p>\n");
        return;
    }

    html.push_str("<h2>Cheapest items</h2>\n<ol>\n");
    for product in &outcome.products {
        let _ = writeln!(
            html,
            "<li><a href=\"{}\" rel=\"noopener noreferrer\" target=\"_blank\">{}</a> <span class=\"price\">{}</span> <span class=\"site\">{}</span></li>",
            attr(&product.url),
            text(&product.name),
            text(&product.price_text),
            text(&product.website)
        );
    }
    html.push_str("</ol>\n");

    let _ = writeln!(html, "<p><a href=\"/export?{}\">Export all as CSV</a></p>", attr(&params.export_query()));
}
