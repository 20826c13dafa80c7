use hbs_args_parser::{
    parse_tag, ArgumentList, CompileContext, Flags, LiteralKind, ParsedArgument, RawTag, Segment,
    SubExpression,
};
use proc_macro::TokenStream;
use quote::quote;
use syn::{parse::Parse, parse::ParseStream, parse_macro_input, Ident, LitStr, Token};

fn segment_tokens(segment: &Segment) -> proc_macro2::TokenStream {
    match segment {
        Segment::Current => quote! { ::hbs_args::Segment::Current },
        Segment::Name(name) => quote! { ::hbs_args::Segment::Name(#name.to_string()) },
    }
}

fn argument_tokens(argument: &ParsedArgument) -> proc_macro2::TokenStream {
    match argument {
        ParsedArgument::Path { levels, segments } => {
            let segments = segments.iter().map(segment_tokens);
            quote! {
                ::hbs_args::ParsedArgument::Path {
                    levels: #levels,
                    segments: vec![#(#segments),*],
                }
            }
        }
        ParsedArgument::Literal { kind, text } => {
            let kind = match kind {
                LiteralKind::Number => quote! { ::hbs_args::LiteralKind::Number },
                LiteralKind::String => quote! { ::hbs_args::LiteralKind::String },
                LiteralKind::Keyword => quote! { ::hbs_args::LiteralKind::Keyword },
            };
            quote! {
                ::hbs_args::ParsedArgument::Literal { kind: #kind, text: #text.to_string() }
            }
        }
        ParsedArgument::SubExpression(SubExpression { args, source }) => {
            let args = list_tokens(args);
            quote! {
                ::hbs_args::ParsedArgument::SubExpression(::hbs_args::SubExpression {
                    args: #args,
                    source: #source.to_string(),
                })
            }
        }
    }
}

/// Expands to a block expression that rebuilds `list` at runtime
fn list_tokens(list: &ArgumentList) -> proc_macro2::TokenStream {
    let positional = list.positional().iter().map(argument_tokens);
    let names = list.named().iter().map(|(name, _)| name);
    let named = list.named().iter().map(|(_, value)| argument_tokens(value));
    let block_params = list.block_params().map(|params| {
        quote! { list.set_block_params(vec![#(#params.to_string()),*]); }
    });
    quote! {
        {
            let mut list = ::hbs_args::ArgumentList::new();
            #(list.push_positional(#positional);)*
            #(list.insert_named(#names, #named);)*
            #block_params
            list
        }
    }
}

/// Template text with an optional dialect: `"..."`, `handlebars, "..."` or `mustache, "..."`
struct TagInput {
    flags: Flags,
    content: LitStr,
}

impl Parse for TagInput {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let flags = if input.peek(Ident) {
            let dialect: Ident = input.parse()?;
            input.parse::<Token![,]>()?;
            match dialect.to_string().as_str() {
                "handlebars" => Flags { allow_arbitrary_helper_expressions: true, ..Flags::handlebars() },
                "mustache" => Flags::mustache(),
                other => {
                    return Err(syn::Error::new(
                        dialect.span(),
                        format!("unknown dialect {other}, expected handlebars or mustache"),
                    ));
                }
            }
        } else {
            Flags { allow_arbitrary_helper_expressions: true, ..Flags::handlebars() }
        };
        let content: LitStr = input.parse()?;
        Ok(TagInput { flags, content })
    }
}

/// Turns the collected diagnostics into one compile error on the literal
fn diagnostics_error(ctx: &CompileContext, content: &LitStr) -> Option<syn::Error> {
    ctx.diagnostics()
        .iter()
        .map(|diagnostic| syn::Error::new(content.span(), diagnostic.to_string()))
        .reduce(|mut all, next| {
            all.combine(next);
            all
        })
}

/// Parses the inside of a tag at compile time and expands to its `ArgumentList`
#[proc_macro]
pub fn args(input: TokenStream) -> TokenStream {
    let TagInput { flags, content } = parse_macro_input!(input as TagInput);
    let mut ctx = CompileContext::new(flags);
    let (_, list) = parse_tag(&RawTag::new(&content.value()), &mut ctx);
    if let Some(err) = diagnostics_error(&ctx, &content) {
        return err.to_compile_error().into();
    }
    TokenStream::from(list_tokens(&list))
}

/// Parses a whole `{{...}}` tag at compile time and expands to `(raw_output, ArgumentList)`
#[proc_macro]
pub fn tag(input: TokenStream) -> TokenStream {
    let TagInput { flags, content } = parse_macro_input!(input as TagInput);
    let text = content.value();
    let mut ctx = CompileContext::new(flags);
    let Some(found) = ctx.tokens().and_then(|tokens| tokens.match_tag(&text)) else {
        return syn::Error::new(content.span(), format!("no tag found in {:?}", text))
            .to_compile_error()
            .into();
    };
    let (raw, list) = parse_tag(&found.tag, &mut ctx);
    if let Some(err) = diagnostics_error(&ctx, &content) {
        return err.to_compile_error().into();
    }
    let list = list_tokens(&list);
    TokenStream::from(quote! { (#raw, #list) })
}
