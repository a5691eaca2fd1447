fn main() {
    #[cfg(target_os = "windows")]
    {
        let mut res = winres::WindowsResource::new();
        res.set("ProductName", "Sales Dashboard");
        res.set("FileDescription", "Sales-opportunity analytics dashboard");
        res.compile().expect("Failed to compile Windows resources");
    }
}
