use hbs_args::{parse_tag, CompileContext, Flags, ParsedArgument};
use tracing_subscriber::EnvFilter;

const TEMPLATE: &str = r#"<ul>
{{#each (filter todos done=false) as |todo index|}}
  <li>{{index}}: {{todo.title}} by {{../owner.[display name]}}</li>
  {{{todo.notes}}}
{{/each}}
</ul>
{{> footer "My Todos"}}"#;

/// Parses every tag in `template`, returning the tag text with its arguments
fn parse_template(template: &str, ctx: &mut CompileContext) -> Vec<(String, bool, Vec<String>)> {
    let mut parsed = Vec::new();
    let mut rest = template;
    while let Some(found) = ctx.tokens().and_then(|tokens| tokens.match_tag(rest)) {
        let (raw, args) = parse_tag(&found.tag, ctx);
        let mut described: Vec<String> = args.positional().iter().map(ParsedArgument::to_string).collect();
        for (name, value) in args.named() {
            described.push(format!("{name}={value}"));
        }
        if let Some(params) = args.block_params() {
            described.push(format!("as |{}|", params.join(" ")));
        }
        parsed.push((found.tag.to_string(), raw, described));
        rest = found.trailing_text;
    }
    parsed
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut ctx = CompileContext::new(Flags::handlebars())
        .with_helpers(|name: &str| matches!(name, "filter" | "concat"));
    for (tag, raw, args) in parse_template(TEMPLATE, &mut ctx) {
        println!("{tag:<50} raw={raw:<5} {}", args.join(", "));
    }
    for diagnostic in ctx.diagnostics() {
        eprintln!("warning: {diagnostic}");
    }

    let (_, compiled) = hbs_args::tag!("{{#with (concat first \" \" last) as |full|}}");
    println!("compiled at build time: {:?}", compiled);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_tag() {
        let mut ctx = CompileContext::new(Flags::handlebars())
            .with_helpers(|name: &str| name == "filter");
        let parsed = parse_template(TEMPLATE, &mut ctx);
        assert_eq!(parsed.len(), 7);
        assert!(!ctx.has_errors(), "{:?}", ctx.diagnostics());

        let (tag, raw, args) = &parsed[0];
        assert_eq!(tag, "{{#each (filter todos done=false) as |todo index|}}");
        assert!(!raw);
        assert_eq!(args, &["each", "(filter todos done=false)", "as |todo index|"]);

        assert_eq!(parsed[3].2, ["../owner.display name"]);
        assert!(parsed[4].1);
        assert_eq!(parsed[6].2, ["footer", "'My Todos'"]);
    }

    #[test]
    fn unknown_helper_is_reported() {
        let mut ctx = CompileContext::new(Flags::handlebars());
        parse_template(TEMPLATE, &mut ctx);
        assert_eq!(ctx.diagnostics().len(), 1);
    }
}
