use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{
    parse_macro_input, spanned::Spanned, FnArg, GenericArgument, ItemFn, Pat, PathArguments,
    Signature, Type,
};

/// Transform an asynchronous test into one run on Rocket's async test runtime,
/// injecting dependencies that all share one fresh in-memory document store.
///
/// Injectable dependencies are [`rocket::local::asynchronous::Client`],
/// `crate::model::store::MemoryStore`, and `crate::model::store::Coll<T>`,
/// in any order.
#[proc_macro_attribute]
pub fn backend_test(_args: TokenStream, input: TokenStream) -> TokenStream {
    let mut item_fn = parse_macro_input!(input as ItemFn);

    // Extract type information and reject invalid function signatures.
    let (test_args, setup) = match check_sig(item_fn.sig.clone()) {
        Ok(args) => args,
        Err(err) => {
            return err.into_compile_error().into();
        }
    };

    // Rename the future so the test can have its original name.
    let name = item_fn.sig.ident.clone();
    let new_name = format_ident!("{}_fut", name);
    item_fn.sig.ident = new_name.clone();

    // Rewrite the test function.
    quote! {
        #[rocket::async_test]
        async fn #name() {
            /// The test itself.
            #item_fn

            log4rs_test_utils::test_logging::init_logging_once_for(
                ["questions_backend"],
                None,
                None,
            );

            // Build a server around a fresh store.
            let __memory_store = crate::model::store::MemoryStore::default();
            let __store = crate::model::store::Store::new(__memory_store.clone());
            let __rocket = crate::rocket_for_store(__store.clone())
                .await
                .expect("failed to build test server");
            let __rocket_client = rocket::local::asynchronous::Client::tracked(__rocket)
                .await
                .expect("failed to launch test client");

            #(#setup)*

            #new_name(#(#test_args),*).await;
        }
    }
    .into()
}

/// Ensure the wrapped test is async, extract parameters to inject, and reject unknown parameters.
fn check_sig(sig: Signature) -> Result<(Vec<TokenStream2>, Vec<TokenStream2>), syn::Error> {
    if sig.asyncness.is_none() {
        return Err(syn::Error::new(sig.span(), "Test must be marked `async`"));
    }

    let mut has_client = false;
    let mut args = vec![];
    let mut setup = vec![];

    for input in &sig.inputs {
        if let FnArg::Typed(pat_type) = input {
            if let (Pat::Ident(pat_ident), Type::Path(type_path)) =
                (&*pat_type.pat, &*pat_type.ty)
            {
                let ident = &pat_ident.ident;
                if let Some(type_ident) = type_path.path.get_ident() {
                    if type_ident == "Client" {
                        if has_client {
                            return Err(syn::Error::new(
                                input.span(),
                                "Test cannot accept more than one `rocket::local::asynchronous::Client`",
                            ));
                        }
                        has_client = true;
                        args.push(quote! { __rocket_client });
                        continue;
                    } else if type_ident == "MemoryStore" {
                        setup.push(quote! {
                            let #ident = __memory_store.clone();
                        });
                        args.push(quote! { #ident });
                        continue;
                    }
                }

                // `Coll<T>`, possibly path-qualified.
                if let Some(possible_collection) = type_path.path.segments.last() {
                    if possible_collection.ident == "Coll" {
                        if let PathArguments::AngleBracketed(generics) =
                            &possible_collection.arguments
                        {
                            if let Some(GenericArgument::Type(collection_type)) =
                                generics.args.first()
                            {
                                setup.push(quote! {
                                    let #ident = crate::model::store::Coll::<#collection_type>::from_store(&__store);
                                });
                                args.push(quote! { #ident });
                                continue;
                            }
                        }
                    }
                }
            }
        }

        return Err(syn::Error::new(
            input.span(),
            "Expected one of `client_ident: Client`, `store_ident: MemoryStore` or `collection_ident: Coll<T>`",
        ));
    }

    Ok((args, setup))
}
