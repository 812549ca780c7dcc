fn main() {
    cat_match::run();
}
