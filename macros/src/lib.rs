use proc_macro::TokenStream;
use quote::quote;
use std::collections::HashMap;
use syn::{
    Attribute, Data, DeriveInput, Expr, Field, Fields, Lit, Meta, Token, UnOp, Visibility, ext::IdentExt,
    parse_macro_input,
};

/// Helper enum for parsed attribute values
enum MetaValue {
    Str(String),
    Literal(String),
    Flag,
}

/// Keys accepted inside `#[field(...)]`
const KNOWN_KEYS: &[&str] = &[
    "env",
    "default",
    "layout",
    "separator",
    "doc",
    "required",
    "nested",
    "prefix",
    "skip",
];

/// Derive `config_bindr::Bind` for a struct with named fields
///
/// Every `pub` field takes part in binding unless marked `#[field(skip)]`;
/// private fields are left alone. Nested structs need `#[field(nested)]`.
#[proc_macro_derive(Bind, attributes(field))]
pub fn derive_bind(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match generate_bind(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn generate_bind(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let struct_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    // Extract fields from the struct
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    "Bind can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "Bind can only be derived for structs",
            ));
        }
    };

    let mut bindings = Vec::new();
    let mut visits = Vec::new();

    for field in fields {
        // Private fields cannot be set from outside and never take part
        if matches!(field.vis, Visibility::Inherited) {
            continue;
        }

        let config = parse_field_config(field)?;
        let field_name = field.ident.as_ref().ok_or_else(|| {
            syn::Error::new_spanned(field, "Bind requires named fields")
        })?;

        let visit = match config {
            FieldConfig::Skip => continue,
            FieldConfig::Nested { prefix } => quote! {
                __walker.group(__prefix, #prefix, #field_name);
            },
            FieldConfig::Leaf(leaf) => {
                let name = field_name.unraw().to_string();
                let env = option_tokens(&leaf.env);
                let default = option_tokens(&leaf.default);
                let layout = option_tokens(&leaf.layout);
                let separator = option_tokens(&leaf.separator);
                let description = &leaf.description;
                let required = leaf.required;

                quote! {
                    __walker.leaf(
                        __prefix,
                        ::config_bindr::FieldSpec {
                            name: #name,
                            env: #env,
                            default: #default,
                            layout: #layout,
                            separator: #separator,
                            description: #description,
                            required: #required,
                        },
                        #field_name,
                    );
                }
            }
        };

        bindings.push(field_name);
        visits.push(visit);
    }

    Ok(quote! {
        impl #impl_generics ::config_bindr::Bind for #struct_name #ty_generics #where_clause {
            #[allow(unused_variables)]
            fn visit<'__bind>(
                &'__bind mut self,
                __prefix: &str,
                __walker: &mut ::config_bindr::Introspector<'__bind>,
            ) {
                let Self { #(#bindings,)* .. } = self;
                #(#visits)*
            }
        }
    })
}

fn option_tokens(value: &Option<String>) -> proc_macro2::TokenStream {
    match value {
        Some(s) => quote! { ::core::option::Option::Some(#s) },
        None => quote! { ::core::option::Option::None },
    }
}

#[derive(Debug)]
enum FieldConfig {
    Skip,
    Nested { prefix: String },
    Leaf(LeafConfig),
}

#[derive(Debug, Default)]
struct LeafConfig {
    env: Option<String>,
    default: Option<String>,
    layout: Option<String>,
    separator: Option<String>,
    description: String,
    required: bool,
}

/// Parse #[field(env = "X", doc = "Y", default = val)] syntax
fn parse_field_list(meta_list: &syn::MetaList) -> syn::Result<HashMap<String, MetaValue>> {
    let mut values = HashMap::new();

    meta_list.parse_nested_meta(|meta| {
        let key = meta
            .path
            .get_ident()
            .ok_or_else(|| meta.error("expected identifier"))?
            .to_string();

        if !KNOWN_KEYS.contains(&key.as_str()) {
            return Err(meta.error(format!(
                "unknown field option `{key}`, expected one of: {}",
                KNOWN_KEYS.join(", ")
            )));
        }

        if meta.input.peek(Token![=]) {
            meta.input.parse::<Token![=]>()?;

            if key == "default" {
                let expr: Expr = meta.input.parse()?;
                values.insert(key, MetaValue::Literal(default_literal(&expr)?));
            } else {
                let value: syn::LitStr = meta.input.parse()?;
                values.insert(key, MetaValue::Str(value.value()));
            }
        } else {
            values.insert(key, MetaValue::Flag);
        }

        Ok(())
    })?;

    Ok(values)
}

/// Turn a `default = ...` expression into the raw text the binder coerces
fn default_literal(expr: &Expr) -> syn::Result<String> {
    match expr {
        Expr::Lit(lit) => match &lit.lit {
            Lit::Str(s) => Ok(s.value()),
            Lit::Int(i) => Ok(i.base10_digits().to_string()),
            Lit::Float(f) => Ok(f.base10_digits().to_string()),
            Lit::Bool(b) => Ok(b.value.to_string()),
            other => Err(syn::Error::new_spanned(
                other,
                "default must be a string, integer, float or bool literal",
            )),
        },
        Expr::Unary(unary) if matches!(unary.op, UnOp::Neg(_)) => {
            Ok(format!("-{}", default_literal(&unary.expr)?))
        }
        other => Err(syn::Error::new_spanned(
            other,
            "default must be a string, integer, float or bool literal",
        )),
    }
}

/// Collect the `///` doc comment of a field into one line
fn doc_comment(attrs: &[Attribute]) -> String {
    attrs
        .iter()
        .filter(|attr| attr.path().is_ident("doc"))
        .filter_map(|attr| match &attr.meta {
            Meta::NameValue(nv) => match &nv.value {
                Expr::Lit(syn::ExprLit { lit: Lit::Str(s), .. }) => Some(s.value().trim().to_string()),
                _ => None,
            },
            _ => None,
        })
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn take_str(parsed: &mut HashMap<String, MetaValue>, key: &str, attr: &Attribute) -> syn::Result<Option<String>> {
    match parsed.remove(key) {
        Some(MetaValue::Str(s)) | Some(MetaValue::Literal(s)) => Ok(Some(s)),
        Some(MetaValue::Flag) => Err(syn::Error::new_spanned(
            attr,
            format!("{key} needs a value: {key} = \"...\""),
        )),
        None => Ok(None),
    }
}

fn take_flag(parsed: &mut HashMap<String, MetaValue>, key: &str, attr: &Attribute) -> syn::Result<bool> {
    match parsed.remove(key) {
        Some(MetaValue::Flag) => Ok(true),
        Some(_) => Err(syn::Error::new_spanned(
            attr,
            format!("{key} is a flag and takes no value"),
        )),
        None => Ok(false),
    }
}

fn parse_field_config(field: &Field) -> syn::Result<FieldConfig> {
    let description = doc_comment(&field.attrs);

    // Fields without #[field(...)] are leaves with no keys
    let Some(field_attr) = field.attrs.iter().find(|attr| attr.path().is_ident("field")) else {
        return Ok(FieldConfig::Leaf(LeafConfig {
            description,
            ..LeafConfig::default()
        }));
    };

    // Parse it as a Meta::List
    let mut parsed = match &field_attr.meta {
        Meta::List(list) => parse_field_list(list)?,
        _ => {
            return Err(syn::Error::new_spanned(
                field_attr,
                "field attribute must be a list: #[field(env = \"...\", ...)]",
            ));
        }
    };

    if take_flag(&mut parsed, "skip", field_attr)? {
        return Ok(FieldConfig::Skip);
    }

    if take_flag(&mut parsed, "nested", field_attr)? {
        let prefix = take_str(&mut parsed, "prefix", field_attr)?.unwrap_or_default();
        if let Some(key) = parsed.keys().next() {
            return Err(syn::Error::new_spanned(
                field_attr,
                format!("nested fields only accept prefix, found {key}"),
            ));
        }
        return Ok(FieldConfig::Nested { prefix });
    }

    if parsed.contains_key("prefix") {
        return Err(syn::Error::new_spanned(
            field_attr,
            "prefix is only valid together with nested",
        ));
    }

    Ok(FieldConfig::Leaf(LeafConfig {
        env: take_str(&mut parsed, "env", field_attr)?,
        default: take_str(&mut parsed, "default", field_attr)?,
        layout: take_str(&mut parsed, "layout", field_attr)?,
        separator: take_str(&mut parsed, "separator", field_attr)?,
        description: take_str(&mut parsed, "doc", field_attr)?
            .map(|s| s.trim().to_string())
            .unwrap_or(description),
        required: take_flag(&mut parsed, "required", field_attr)?,
    }))
}
