
pub use factory::CfgFactory;
