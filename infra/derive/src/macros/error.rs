use fxhash::FxHashSet;
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{
    Attribute, Data, DeriveInput, Field, Fields, FieldsNamed, GenericArgument, Ident,
    PathArguments, Type,
};

const INTERNAL: &str = "Internal";

struct ErrorVariant<'a> {
    ident: &'a Ident,
    source: Option<&'a Field>,
    has_context: bool,
    cfg: Vec<&'a Attribute>,
}

impl ErrorVariant<'_> {
    fn is_internal(&self) -> bool {
        self.ident == INTERNAL
    }
}

struct ErrorEnum<'a> {
    name: &'a Ident,
    ext: Ident,
    variants: Vec<ErrorVariant<'a>>,
}

pub fn expand(input: DeriveInput) -> TokenStream {
    let error_enum = match ErrorEnum::parse(&input) {
        Ok(error_enum) => error_enum,
        Err(err) => return err.to_compile_error(),
    };

    let derives = missing_derives(&input);
    let ext_trait = error_enum.ext_trait();
    let source_impls = error_enum.source_impls();
    let internal_impls = error_enum.internal_impls();
    let accessor = error_enum.context_accessor();

    quote! {
        #[allow(non_shorthand_field_patterns)]
        #derives
        #input

        #ext_trait
        #source_impls
        #internal_impls
        #accessor

        #[allow(dead_code)]
        fn format_context(context: &Option<std::borrow::Cow<'static, str>>) -> std::borrow::Cow<'static, str> {
            context.as_ref().map_or(std::borrow::Cow::Borrowed(""), |c| std::borrow::Cow::Owned(format!(" ({c})")))
        }
    }
}

impl<'a> ErrorEnum<'a> {
    fn parse(input: &'a DeriveInput) -> syn::Result<Self> {
        let Data::Enum(data) = &input.data else {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "provis_error can only be applied to enums",
            ));
        };

        let mut variants = Vec::with_capacity(data.variants.len());
        for variant in &data.variants {
            let Fields::Named(fields) = &variant.fields else {
                return Err(syn::Error::new_spanned(
                    variant,
                    "provis_error variants must use named fields",
                ));
            };

            let has_context = context_field(fields)?.is_some();
            let source = source_field(fields);
            if source.is_some() && !has_context {
                return Err(syn::Error::new_spanned(
                    &variant.ident,
                    "variants with a source need `context: Option<Cow<'static, str>>`",
                ));
            }

            variants.push(ErrorVariant {
                ident: &variant.ident,
                source,
                has_context,
                cfg: variant.attrs.iter().filter(|a| a.path().is_ident("cfg")).collect(),
            });
        }

        Ok(Self { name: &input.ident, ext: format_ident!("{}Ext", input.ident), variants })
    }

    fn ext_trait(&self) -> TokenStream {
        let name = self.name;
        let ext = &self.ext;
        let arms = self.variants.iter().filter(|v| v.has_context).map(|v| {
            let ident = v.ident;
            let cfg = &v.cfg;
            quote! { #(#cfg)* #name::#ident { context: slot, .. } => *slot = Some(context.into()), }
        });

        quote! {
            pub trait #ext<T> {
                fn context(self, context: impl Into<std::borrow::Cow<'static, str>>) -> Result<T, #name>;
            }

            #[automatically_derived]
            impl<T> #ext<T> for Result<T, #name> {
                #[inline]
                fn context(self, context: impl Into<std::borrow::Cow<'static, str>>) -> Self {
                    self.map_err(|mut err| {
                        #[allow(unreachable_patterns)]
                        match &mut err {
                            #(#arms)*
                            _ => {}
                        }
                        err
                    })
                }
            }
        }
    }

    fn source_impls(&self) -> TokenStream {
        let name = self.name;
        let ext = &self.ext;
        let impls = self.variants.iter().filter(|v| !v.is_internal()).filter_map(|v| {
            let field = v.source?;
            let field_ident = field.ident.as_ref()?;
            let ty = &field.ty;
            let ident = v.ident;
            let cfg = &v.cfg;

            Some(quote! {
                #(#cfg)*
                #[automatically_derived]
                impl From<#ty> for #name {
                    #[inline]
                    fn from(#field_ident: #ty) -> Self { Self::#ident { #field_ident, context: None } }
                }

                #(#cfg)*
                impl<T> #ext<T> for std::result::Result<T, #ty> {
                    #[inline]
                    fn context(self, context: impl Into<std::borrow::Cow<'static, str>>) -> std::result::Result<T, #name> {
                        self.map_err(|#field_ident| #name::#ident { #field_ident, context: Some(context.into()) })
                    }
                }
            })
        });

        quote! { #(#impls)* }
    }

    fn internal_impls(&self) -> TokenStream {
        let Some(internal) = self.variants.iter().find(|v| v.is_internal()) else {
            return TokenStream::new();
        };
        let name = self.name;
        let cfg = &internal.cfg;
        let context = if internal.has_context { quote!(, context: None) } else { quote!() };

        quote! {
            #(#cfg)*
            impl From<&'static str> for #name {
                #[inline]
                fn from(s: &'static str) -> Self {
                    Self::Internal { message: std::borrow::Cow::Borrowed(s) #context }
                }
            }

            #(#cfg)*
            impl From<String> for #name {
                #[inline]
                fn from(s: String) -> Self {
                    Self::Internal { message: std::borrow::Cow::Owned(s) #context }
                }
            }
        }
    }

    fn context_accessor(&self) -> TokenStream {
        let name = self.name;
        let arms = self.variants.iter().filter(|v| v.has_context).map(|v| {
            let ident = v.ident;
            let cfg = &v.cfg;
            quote! { #(#cfg)* Self::#ident { context, .. } => context.as_deref(), }
        });

        quote! {
            impl #name {
                /// Context attached through the generated `context(..)` extension, if any.
                #[must_use]
                #[allow(unreachable_patterns)]
                pub fn attached_context(&self) -> Option<&str> {
                    match self {
                        #(#arms)*
                        _ => None,
                    }
                }
            }
        }
    }
}

fn context_field(fields: &FieldsNamed) -> syn::Result<Option<&Field>> {
    let Some(field) =
        fields.named.iter().find(|f| f.ident.as_ref().is_some_and(|ident| ident == "context"))
    else {
        return Ok(None);
    };

    if is_cow_option(&field.ty) {
        Ok(Some(field))
    } else {
        Err(syn::Error::new_spanned(&field.ty, "context field must be Option<Cow<'static, str>>"))
    }
}

fn source_field(fields: &FieldsNamed) -> Option<&Field> {
    fields.named.iter().find(|field| {
        field.ident.as_ref().is_some_and(|ident| ident == "source")
            || field.attrs.iter().any(|a| a.path().is_ident("source") || a.path().is_ident("from"))
    })
}

fn missing_derives(input: &DeriveInput) -> TokenStream {
    let mut present = FxHashSet::default();
    for attr in input.attrs.iter().filter(|a| a.path().is_ident("derive")) {
        let _ = attr.parse_nested_meta(|meta| {
            if let Some(segment) = meta.path.segments.last() {
                present.insert(segment.ident.to_string());
            }
            Ok(())
        });
    }

    let mut derives = Vec::new();
    if !present.contains("Debug") {
        derives.push(quote!(Debug));
    }
    if !present.contains("Error") {
        derives.push(quote!(::thiserror::Error));
    }

    if derives.is_empty() { TokenStream::new() } else { quote! { #[derive(#(#derives),*)] } }
}

/// Matches `Option<Cow<'static, str>>` by trailing path segments.
fn is_cow_option(ty: &Type) -> bool {
    let Some(inner) = single_type_arg(ty, "Option") else {
        return false;
    };
    let Type::Path(path) = inner else {
        return false;
    };
    let Some(cow) = path.path.segments.last().filter(|seg| seg.ident == "Cow") else {
        return false;
    };
    let PathArguments::AngleBracketed(args) = &cow.arguments else {
        return false;
    };

    let mut args = args.args.iter();
    let is_static =
        matches!(args.next(), Some(GenericArgument::Lifetime(lt)) if lt.ident == "static");
    let is_str = matches!(
        args.next(),
        Some(GenericArgument::Type(Type::Path(p)))
            if p.path.segments.last().is_some_and(|seg| seg.ident == "str")
    );

    is_static && is_str
}

fn single_type_arg<'t>(ty: &'t Type, outer: &str) -> Option<&'t Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    let segment = path.path.segments.last().filter(|seg| seg.ident == outer)?;
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    match args.args.first() {
        Some(GenericArgument::Type(inner)) => Some(inner),
        _ => None,
    }
}
