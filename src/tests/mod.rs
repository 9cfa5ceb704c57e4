mod common;

mod renewal_atomicity;
