//! HTML markup for rendered tables.
//!
//! Templates are compiled once. All values go through handlebars' HTML
//! escaping; the only raw markup comes from the templates themselves.

use crate::error::Result;
use crate::render::Table;
use handlebars::Handlebars;
use lazy_static::lazy_static;
use serde::Serialize;

const TABLE_TEMPLATE: &str = concat!(
    "<table id=\"data-table\"><thead><tr>",
    "{{#each headers}}<th>{{this}}</th>{{/each}}",
    "</tr></thead><tbody>",
    "{{#if notice}}<tr><td colspan=\"{{span}}\" class=\"notice\">{{notice}}</td></tr>{{/if}}",
    "{{#each rows}}<tr>{{#each this}}<td>{{> cell}}</td>{{/each}}</tr>{{/each}}",
    "</tbody></table>",
);

const CELL_PARTIAL: &str = concat!(
    "{{#if (eq kind \"text\")}}{{text}}{{/if}}",
    "{{#if (eq kind \"long_text\")}}",
    "<div class=\"article-content-container{{#if collapsible}} collapsed{{/if}}\">",
    "{{#each lines}}{{#unless @first}}<br>{{/unless}}{{this}}{{/each}}",
    "</div>",
    "{{#if collapsible}}<button type=\"button\" class=\"read-more-btn\">Read more...</button>{{/if}}",
    "{{/if}}",
    "{{#if (eq kind \"issues\")}}<ul>{{#each items}}<li>",
    "{{before}}",
    "{{#if ticket}}<a href=\"{{ticket.url}}\" target=\"_blank\">{{ticket.key}}</a>{{/if}}",
    "{{after}}",
    "</li>{{/each}}</ul>{{/if}}",
    "{{#if (eq kind \"source_refs\")}}<ul>{{#each items}}<li>",
    "{{#if (eq shape \"unparsed\")}}{{text}}{{else}}",
    "{{name}}{{#if location}} ({{location}}){{/if}} (",
    "{{#each lines}}{{#unless @first}} {{/unless}}",
    "<a href=\"{{#if url}}{{url}}{{else}}#{{/if}}\" target=\"_blank\">{{line}}</a>",
    "{{#if annotated}}<span class=\"info-icon\" data-text=\"{{note}}\">i</span>{{/if}}",
    "{{/each}})",
    "{{/if}}",
    "</li>{{/each}}</ul>{{/if}}",
);

lazy_static! {
    static ref TEMPLATES: Handlebars<'static> = {
        let mut registry = Handlebars::new();
        registry
            .register_partial("cell", CELL_PARTIAL)
            .expect("cell partial is valid");
        registry
            .register_template_string("table", TABLE_TEMPLATE)
            .expect("table template is valid");
        registry
    };
}

#[derive(Serialize)]
struct TableView<'a> {
    #[serde(flatten)]
    table: &'a Table,
    span: usize,
}

/// Markup for the whole `<table>` element.
pub fn table_html(table: &Table) -> Result<String> {
    let view = TableView {
        table,
        span: table.span(),
    };
    Ok(TEMPLATES.render("table", &view)?)
}
