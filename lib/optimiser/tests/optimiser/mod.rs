mod identity_filter;
mod implicit_join;
mod lazy_bgp;
mod pipeline;
mod reorder;
mod strict;
mod utils;
