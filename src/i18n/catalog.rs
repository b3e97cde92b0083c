pub(super) const EN: &[(&str, &str)] = &[
    ("required", "{0} is a required field"),
    ("email", "{0} must be a valid email address"),
    ("min", "{0} must be at least {1} characters in length"),
    ("max", "{0} must be a maximum of {1} characters in length"),
    ("gte", "{0} must be {1} or greater"),
    ("accountNotExist", "Account does not exist"),
    ("wrongPassword", "Wrong password"),
    ("passwordNotMatch", "Passwords do not match"),
    ("emailExists", "Email is already in use"),
];

pub(super) const VI: &[(&str, &str)] = &[
    ("required", "{0} không được bỏ trống"),
    ("email", "{0} phải là một địa chỉ email hợp lệ"),
    ("min", "{0} phải chứa ít nhất {1} ký tự"),
    ("max", "{0} chỉ được chứa tối đa {1} ký tự"),
    ("gte", "{0} phải lớn hơn hoặc bằng {1}"),
    ("accountNotExist", "Tài khoản không tồn tại"),
    ("wrongPassword", "Mật khẩu không đúng"),
    ("passwordNotMatch", "Mật khẩu nhập lại không khớp"),
    ("emailExists", "Email đã được sử dụng"),
];
