use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{parse_macro_input, spanned::Spanned, FnArg, Ident, ItemFn, Pat, Signature, Type};

/// Transform an asynchronous test into a synchronous one and inject
/// dependencies.
///
/// The server under test runs over in-memory storage and scripted remote
/// services. Injectable dependencies are [`rocket::local::asynchronous::Client`],
/// `ScriptedServices`, `MemoryVoterDirectory`, `MemoryVoteLedger`, and
/// `VoterSession`; the last requires `#[backend_test(voter)]`, which registers
/// the example voter before the test starts.
#[proc_macro_attribute]
pub fn backend_test(args: TokenStream, input: TokenStream) -> TokenStream {
    let mut item_fn = parse_macro_input!(input as ItemFn);

    let login = match parse_macro_input!(args as Option<Ident>) {
        None => false,
        Some(arg) if arg == "voter" => true,
        Some(arg) => {
            return syn::Error::new(arg.span(), "Expected `voter` or no argument")
                .into_compile_error()
                .into();
        }
    };

    // Extract type information and reject invalid function signatures.
    let test_args = match check_sig(item_fn.sig.clone(), login) {
        Ok(args) => args,
        Err(err) => {
            return err.into_compile_error().into();
        }
    };

    // Rename the future so the test can have its original name.
    let name = item_fn.sig.ident.clone();
    let new_name = format_ident!("{}_fut", name);
    item_fn.sig.ident = new_name.clone();

    // Register the example voter and keep their token if needed.
    let maybe_login = if login {
        quote! {
            let response = fixtures
                .client
                .post(uri!(crate::api::auth::register))
                .header(rocket::http::ContentType::JSON)
                .body(rocket::serde::json::json!(crate::model::api::Credentials::example()).to_string())
                .dispatch()
                .await;
            assert_eq!(response.status(), rocket::http::Status::Ok);
            let session: crate::model::api::Session = response.into_json().await.unwrap();
            let session = Some(crate::VoterSession::new(session));
        }
    } else {
        quote! {
            let session: Option<crate::VoterSession> = None;
        }
    };

    // Rewrite the test function.
    quote! {
        #[test]
        fn #name() {
            /// Test setup.
            async fn setup() -> (crate::Fixtures, Option<crate::VoterSession>) {
                let fixtures = crate::Fixtures::new().await;

                #maybe_login

                (fixtures, session)
            }

            /// The test itself.
            #item_fn

            let runtime = rocket::tokio::runtime::Builder::new_multi_thread()
                .thread_name("rocket-worker-test-thread")
                .worker_threads(2)
                .enable_all()
                .build()
                .unwrap();

            runtime.block_on(async {
                #[allow(unused_variables)]
                let (crate::Fixtures { client: rocket_client, services, voters, votes }, session) =
                    setup().await;
                #new_name(#(#test_args),*).await;
            });
        }
    }
    .into()
}

/// Ensure the wrapped test is async, extract parameters to inject, and reject unknown parameters.
fn check_sig(sig: Signature, login: bool) -> Result<Vec<TokenStream2>, syn::Error> {
    if sig.asyncness.is_none() {
        return Err(syn::Error::new(sig.span(), "Test must be marked `async`"));
    }

    let mut seen = vec![];
    let mut args = vec![];

    for input in &sig.inputs {
        if let FnArg::Typed(pat_type) = input {
            if let (Pat::Ident(_), Type::Path(type_path)) = (&*pat_type.pat, &*pat_type.ty) {
                if let Some(type_ident) = type_path.path.segments.last().map(|s| s.ident.clone()) {
                    let arg = if type_ident == "Client" {
                        quote! { rocket_client }
                    } else if type_ident == "ScriptedServices" {
                        quote! { services.clone() }
                    } else if type_ident == "MemoryVoterDirectory" {
                        quote! { voters.clone() }
                    } else if type_ident == "MemoryVoteLedger" {
                        quote! { votes.clone() }
                    } else if type_ident == "VoterSession" {
                        if !login {
                            return Err(syn::Error::new(
                                input.span(),
                                "`VoterSession` requires `#[backend_test(voter)]`",
                            ));
                        }
                        quote! { session.unwrap() }
                    } else {
                        return Err(unexpected(input));
                    };

                    if seen.contains(&type_ident) {
                        return Err(syn::Error::new(
                            input.span(),
                            format!("Test cannot accept more than one `{type_ident}`"),
                        ));
                    }
                    seen.push(type_ident);
                    args.push(arg);
                    continue;
                }
            }
        }

        return Err(unexpected(input));
    }

    Ok(args)
}

fn unexpected(input: &FnArg) -> syn::Error {
    syn::Error::new(
        input.span(),
        "Expected one of `Client`, `ScriptedServices`, `MemoryVoterDirectory`, `MemoryVoteLedger` or `VoterSession`",
    )
}
