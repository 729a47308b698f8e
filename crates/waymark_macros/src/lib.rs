use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, FnArg, ItemFn, Pat};

/// Time a navigation system when the `perf_stats` feature is enabled.
///
/// The function body is wrapped in a drop guard that reports the elapsed
/// time once the body returns. Without the feature the guard is compiled
/// out entirely.
///
/// # Tick detection
/// If the function takes a parameter named `tick` whose type mentions
/// `NavTick`, the guard also reports on every 100th tick regardless of
/// the threshold, so the per-frame flow field cost shows up in the log
/// even when it is cheap.
///
/// # Example
/// ```ignore
/// #[profile(2)] // threshold in milliseconds, defaults to 1
/// pub fn update_flow_field(
///     mut navigator: ResMut<Navigator>,
///     tick: Res<NavTick>,
/// ) {
///     // ...
/// }
/// ```
#[proc_macro_attribute]
pub fn profile(attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);

    let threshold_ms: u128 = if attr.is_empty() {
        1
    } else {
        attr.to_string().trim().parse().unwrap_or(1)
    };

    let attrs = &input.attrs;
    let vis = &input.vis;
    let sig = &input.sig;
    let block = &input.block;
    let system_name = sig.ident.to_string();

    let tick_param = sig.inputs.iter().any(|arg| {
        let FnArg::Typed(pat_type) = arg else {
            return false;
        };
        let Pat::Ident(pat_ident) = &*pat_type.pat else {
            return false;
        };
        let ty = &pat_type.ty;
        pat_ident.ident == "tick" && quote!(#ty).to_string().contains("NavTick")
    });

    let guard = if tick_param {
        quote! {
            struct NavProfileGuard {
                system: &'static str,
                start: std::time::Instant,
                tick: u64,
            }
            impl Drop for NavProfileGuard {
                fn drop(&mut self) {
                    let elapsed = self.start.elapsed();
                    if elapsed.as_millis() > #threshold_ms || self.tick % 100 == 0 {
                        bevy::prelude::info!("[PERF] {} @ tick {}: {:?}", self.system, self.tick, elapsed);
                    }
                }
            }
            NavProfileGuard {
                system: #system_name,
                start: std::time::Instant::now(),
                tick: tick.0,
            }
        }
    } else {
        quote! {
            struct NavProfileGuard {
                system: &'static str,
                start: std::time::Instant,
            }
            impl Drop for NavProfileGuard {
                fn drop(&mut self) {
                    let elapsed = self.start.elapsed();
                    if elapsed.as_millis() > #threshold_ms {
                        bevy::prelude::info!("[PERF] {}: {:?}", self.system, elapsed);
                    }
                }
            }
            NavProfileGuard {
                system: #system_name,
                start: std::time::Instant::now(),
            }
        }
    };

    let output = quote! {
        #(#attrs)*
        #vis #sig {
            #[cfg(feature = "perf_stats")]
            let _nav_profile_guard = {
                #guard
            };

            #block
        }
    };

    output.into()
}
