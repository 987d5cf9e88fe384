use crate::attrs::FieldAttrs;
use proc_macro2::TokenStream;
use quote::{ToTokens, quote};
use syn::{Data, DeriveInput, Fields, LitStr, Visibility, spanned::Spanned};

pub(crate) fn derive(input: &DeriveInput) -> syn::Result<TokenStream> {
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new(
            input.generics.span(),
            "Scannable cannot be derived for generic structs",
        ));
    }

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(syn::Error::new(
                    input.ident.span(),
                    "Scannable requires a struct with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new(
                input.ident.span(),
                "Scannable can only be derived for structs",
            ));
        }
    };

    let name = &input.ident;
    let name_lit = LitStr::new(&name.to_string(), name.span());

    let mut descriptors = Vec::with_capacity(fields.len());
    let mut arms = Vec::new();

    for (index, field) in fields.iter().enumerate() {
        let attrs = FieldAttrs::parse(&field.attrs)?;
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let ty = &field.ty;

        let field_name = ident.to_string();
        let field_name = field_name.trim_start_matches("r#");
        let field_lit = LitStr::new(field_name, ident.span());
        let ty_lit = LitStr::new(&type_text(ty), ty.span());
        let rename = match attrs.descriptor_rename() {
            Some(rename) => {
                let lit = LitStr::new(rename, ident.span());
                quote!(::core::option::Option::Some(#lit))
            }
            None => quote!(::core::option::Option::None),
        };
        let exported = !matches!(field.vis, Visibility::Inherited);

        let kind = if attrs.embed {
            quote! {
                ::rowscan::FieldKind::Embedded {
                    descriptor: <#ty as ::rowscan::Embed>::descriptor,
                    lazy: <#ty as ::rowscan::Embed>::LAZY,
                }
            }
        } else {
            quote!(::rowscan::FieldKind::Leaf)
        };

        descriptors.push(quote! {
            ::rowscan::FieldDescriptor {
                name: #field_lit,
                ty: #ty_lit,
                rename: #rename,
                exported: #exported,
                kind: #kind,
            }
        });

        if exported && !attrs.skip {
            let member = if attrs.embed {
                quote!(::rowscan::Member::Embedded(&mut self.#ident))
            } else {
                quote!(::rowscan::Member::Leaf(&mut self.#ident))
            };
            arms.push(quote! {
                #index => ::core::option::Option::Some(#member),
            });
        }
    }

    Ok(quote! {
        impl ::rowscan::Record for #name {
            fn descriptor() -> &'static ::rowscan::StructDescriptor {
                static DESCRIPTOR: ::rowscan::StructDescriptor = ::rowscan::StructDescriptor {
                    name: #name_lit,
                    fields: &[#(#descriptors),*],
                };
                &DESCRIPTOR
            }

            fn member_mut(&mut self, index: usize) -> ::core::option::Option<::rowscan::Member<'_>> {
                match index {
                    #(#arms)*
                    _ => ::core::option::Option::None,
                }
            }
        }

        impl ::rowscan::Embedded for #name {
            fn is_allocated(&self) -> bool {
                true
            }

            fn record_mut(&mut self) -> &mut dyn ::rowscan::Record {
                self
            }
        }

        impl ::rowscan::Embed for #name {
            const LAZY: bool = false;

            fn descriptor() -> &'static ::rowscan::StructDescriptor {
                <Self as ::rowscan::Record>::descriptor()
            }
        }

        impl ::rowscan::Destination for #name {
            fn shape() -> ::rowscan::Result<::rowscan::Shape> {
                ::core::result::Result::Ok(::rowscan::Shape::Struct(
                    <Self as ::rowscan::Record>::descriptor(),
                ))
            }

            fn target(&mut self) -> ::rowscan::Target<'_> {
                ::rowscan::Target::Struct(self)
            }
        }
    })
}

/// Renders a type the way it is usually written, e.g. `Option<Box<Foo>>`.
fn type_text(ty: &syn::Type) -> String {
    ty.to_token_stream()
        .to_string()
        .replace(" < ", "<")
        .replace("< ", "<")
        .replace(" <", "<")
        .replace(" >", ">")
        .replace(" ,", ",")
        .replace(" :: ", "::")
        .replace(":: ", "::")
        .replace("& ", "&")
}
